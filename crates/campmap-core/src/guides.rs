//! Alignment guides and drag snapping.
//!
//! Guides are user-placed ruler lines in logical coordinates. The snap
//! functions compute how a dragged object should be adjusted so one of
//! its edges lands exactly on a nearby guide.

use crate::events::{EventEmitter, Subscription};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a guide.
pub type GuideId = Uuid;

/// Distance in logical pixels within which an object edge snaps to a guide.
pub const SNAP_THRESHOLD: f64 = 5.0;

/// Distance within which dragging off a ruler picks up an existing guide
/// instead of creating a duplicate.
pub const GUIDE_PICKUP_THRESHOLD: f64 = 10.0;

/// Guide orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A user-placed alignment line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Guide {
    pub id: GuideId,
    pub orientation: Orientation,
    /// Position in logical coordinates: x for vertical guides, y for
    /// horizontal guides.
    pub position: f64,
}

/// Change notifications emitted by [`GuideStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideEvent {
    Added(GuideId),
    Moved(GuideId),
    Removed(GuideId),
}

/// Ordered collection of guides for one map.
///
/// Insertion order is preserved for UI display and for the snap engine's
/// first-match-wins behavior.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GuideStore {
    guides: Vec<Guide>,
    #[serde(skip)]
    listeners: EventEmitter<GuideEvent>,
}

impl Clone for GuideStore {
    fn clone(&self) -> Self {
        // Observers are host wiring and do not travel with the data.
        Self {
            guides: self.guides.clone(),
            listeners: EventEmitter::new(),
        }
    }
}

impl GuideStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a guide with a freshly generated id. Returns the new id.
    pub fn add(&mut self, orientation: Orientation, position: f64) -> GuideId {
        let guide = Guide {
            id: Uuid::new_v4(),
            orientation,
            position,
        };
        self.guides.push(guide);
        self.listeners.emit(&GuideEvent::Added(guide.id));
        guide.id
    }

    /// Insert a guide, overwriting any existing guide with the same id.
    pub fn upsert(&mut self, guide: Guide) {
        if let Some(existing) = self.guides.iter_mut().find(|g| g.id == guide.id) {
            *existing = guide;
            self.listeners.emit(&GuideEvent::Moved(guide.id));
        } else {
            self.guides.push(guide);
            self.listeners.emit(&GuideEvent::Added(guide.id));
        }
    }

    /// Move an existing guide to a new position.
    /// Returns false if the id is unknown.
    pub fn set_position(&mut self, id: GuideId, position: f64) -> bool {
        if let Some(guide) = self.guides.iter_mut().find(|g| g.id == id) {
            guide.position = position;
            self.listeners.emit(&GuideEvent::Moved(id));
            true
        } else {
            false
        }
    }

    /// Remove a guide by id.
    pub fn remove(&mut self, id: GuideId) -> Option<Guide> {
        let index = self.guides.iter().position(|g| g.id == id)?;
        let guide = self.guides.remove(index);
        self.listeners.emit(&GuideEvent::Removed(id));
        Some(guide)
    }

    /// Look up a guide by id.
    pub fn get(&self, id: GuideId) -> Option<&Guide> {
        self.guides.iter().find(|g| g.id == id)
    }

    /// All guides in insertion order.
    pub fn guides(&self) -> &[Guide] {
        &self.guides
    }

    /// Number of guides in the store.
    pub fn len(&self) -> usize {
        self.guides.len()
    }

    /// Check whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.guides.is_empty()
    }

    /// Remove all guides.
    pub fn clear(&mut self) {
        let ids: Vec<GuideId> = self.guides.iter().map(|g| g.id).collect();
        self.guides.clear();
        for id in ids {
            self.listeners.emit(&GuideEvent::Removed(id));
        }
    }

    /// Register an observer for guide changes.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&GuideEvent) + 'static,
    ) -> Subscription {
        self.listeners.subscribe(listener)
    }

    /// Remove a previously registered observer.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.listeners.unsubscribe(subscription)
    }
}

/// Result of a snap computation.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    /// Object position adjusted so the matched edges sit exactly on their
    /// guides.
    pub position: Point,
    /// Guides that produced a snap, for visual feedback. At most one per
    /// axis.
    pub lines: Vec<Guide>,
}

/// Compute the snap adjustment for an object being dragged.
///
/// Per axis, the object's candidate edges are tested in a fixed order
/// (left, center, right against vertical guides; top, center, bottom
/// against horizontal guides). Guides are tested in stored order and the
/// first edge within `threshold` wins the axis; remaining guides on that
/// axis are skipped.
///
/// Returns `None` when neither axis matched.
pub fn compute_snap(
    position: Point,
    size: Size,
    guides: &[Guide],
    threshold: f64,
) -> Option<SnapResult> {
    let mut snapped = position;
    let mut lines = Vec::new();
    let mut x_snapped = false;
    let mut y_snapped = false;

    for guide in guides {
        match guide.orientation {
            Orientation::Vertical if !x_snapped => {
                // Edge offsets from the object origin: left, center, right.
                let offsets = [0.0, size.width / 2.0, size.width];
                for offset in offsets {
                    if (position.x + offset - guide.position).abs() <= threshold {
                        snapped.x = guide.position - offset;
                        lines.push(*guide);
                        x_snapped = true;
                        break;
                    }
                }
            }
            Orientation::Horizontal if !y_snapped => {
                // Top, center, bottom.
                let offsets = [0.0, size.height / 2.0, size.height];
                for offset in offsets {
                    if (position.y + offset - guide.position).abs() <= threshold {
                        snapped.y = guide.position - offset;
                        lines.push(*guide);
                        y_snapped = true;
                        break;
                    }
                }
            }
            _ => {}
        }
        if x_snapped && y_snapped {
            break;
        }
    }

    if lines.is_empty() {
        None
    } else {
        Some(SnapResult {
            position: snapped,
            lines,
        })
    }
}

/// Find the nearest guide of the given orientation within `threshold` of a
/// position. Used when dragging a new guide off a ruler so the drag picks
/// up an existing guide instead of creating a duplicate.
pub fn closest_guide(
    position: f64,
    guides: &[Guide],
    orientation: Orientation,
    threshold: f64,
) -> Option<&Guide> {
    let mut best: Option<(&Guide, f64)> = None;
    for guide in guides.iter().filter(|g| g.orientation == orientation) {
        let distance = (guide.position - position).abs();
        if distance <= threshold && best.is_none_or(|(_, d)| distance < d) {
            best = Some((guide, distance));
        }
    }
    best.map(|(guide, _)| guide)
}
