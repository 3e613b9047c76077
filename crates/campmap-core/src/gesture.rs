//! Touch gesture interpretation: turns raw contact streams into pan and
//! pinch-zoom intents.
//!
//! The interpreter never mutates a viewport itself; it emits intents and
//! leaves applying them to the host, keeping it canvas-agnostic.

use kurbo::{Point, Vec2};

/// Minimum change in inter-contact distance before a pinch update is
/// emitted. Filters sensor jitter that would otherwise cause zoom flicker.
pub const PINCH_JITTER_THRESHOLD: f64 = 10.0;

/// Current interpreter state, derived from the active contact count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    /// No active contacts.
    Idle,
    /// One contact; the host canvas handles pass-through panning.
    SingleActive,
    /// Two or more contacts; the first two define the pinch.
    Pinching,
}

/// A discrete intent produced from raw input. The caller applies it to the
/// viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureIntent {
    /// Pan by a screen-space delta.
    Pan(Vec2),
    /// Zoom by a multiplicative factor, anchored at a screen point.
    PinchZoom { factor: f64, anchor: Point },
}

/// Interprets a serialized stream of contact events.
#[derive(Debug, Default)]
pub struct GestureInterpreter {
    /// Active contacts in the order they landed.
    contacts: Vec<(u64, Point)>,
    /// Inter-contact distance at the last emitted (or initial) pinch sample.
    last_distance: Option<f64>,
}

impl GestureInterpreter {
    /// Create a new interpreter with no active contacts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase based on the active contact count.
    pub fn phase(&self) -> GesturePhase {
        match self.contacts.len() {
            0 => GesturePhase::Idle,
            1 => GesturePhase::SingleActive,
            _ => GesturePhase::Pinching,
        }
    }

    /// Whether a pinch is in progress. Hosts suppress their own
    /// single-touch handling while this is true.
    pub fn is_pinching(&self) -> bool {
        self.phase() == GesturePhase::Pinching
    }

    /// Number of active contacts.
    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    /// A contact has landed. On the transition to two contacts the initial
    /// pinch distance is recorded.
    pub fn contact_down(&mut self, id: u64, position: Point) {
        if let Some(contact) = self.contacts.iter_mut().find(|(cid, _)| *cid == id) {
            contact.1 = position;
        } else {
            self.contacts.push((id, position));
        }

        if self.contacts.len() >= 2 && self.last_distance.is_none() {
            self.last_distance = Some(self.pinch_distance());
        }
    }

    /// A contact has moved. While pinching, returns a zoom intent when the
    /// distance change exceeds the jitter threshold; otherwise `None`.
    pub fn contact_move(&mut self, id: u64, position: Point) -> Option<GestureIntent> {
        let contact = self.contacts.iter_mut().find(|(cid, _)| *cid == id)?;
        contact.1 = position;

        if self.contacts.len() < 2 {
            // Single-contact moves are host-handled pass-through.
            return None;
        }

        let distance = self.pinch_distance();
        let last = *self.last_distance.get_or_insert(distance);

        if (distance - last).abs() < PINCH_JITTER_THRESHOLD {
            return None;
        }
        if last <= f64::EPSILON {
            // Contacts started coincident; re-baseline instead of dividing
            // by zero.
            self.last_distance = Some(distance);
            return None;
        }

        self.last_distance = Some(distance);
        Some(GestureIntent::PinchZoom {
            factor: distance / last,
            anchor: self.pinch_midpoint(),
        })
    }

    /// A contact has lifted. Dropping below two contacts cancels the pinch.
    pub fn contact_up(&mut self, id: u64) {
        let Some(index) = self.contacts.iter().position(|(cid, _)| *cid == id) else {
            return;
        };
        self.contacts.remove(index);

        if self.contacts.len() < 2 {
            self.last_distance = None;
        } else if index < 2 {
            // The lifted contact was part of the pinch pair, so a new pair
            // takes over. Re-baseline so the next move is measured against
            // the new pair's distance, not the old pair's.
            self.last_distance = Some(self.pinch_distance());
        }
    }

    /// Translate a wheel/trackpad scroll into a pan intent.
    pub fn scroll_pan(&self, delta: Vec2) -> GestureIntent {
        GestureIntent::Pan(delta)
    }

    /// Drop all contacts and pinch state.
    pub fn reset(&mut self) {
        self.contacts.clear();
        self.last_distance = None;
    }

    fn pinch_distance(&self) -> f64 {
        let a = self.contacts[0].1;
        let b = self.contacts[1].1;
        a.distance(b)
    }

    fn pinch_midpoint(&self) -> Point {
        let a = self.contacts[0].1;
        let b = self.contacts[1].1;
        a.midpoint(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_transitions() {
        let mut gesture = GestureInterpreter::new();
        assert_eq!(gesture.phase(), GesturePhase::Idle);

        gesture.contact_down(1, Point::new(100.0, 100.0));
        assert_eq!(gesture.phase(), GesturePhase::SingleActive);

        gesture.contact_down(2, Point::new(200.0, 100.0));
        assert_eq!(gesture.phase(), GesturePhase::Pinching);
        assert!(gesture.is_pinching());

        gesture.contact_up(2);
        assert_eq!(gesture.phase(), GesturePhase::SingleActive);

        gesture.contact_up(1);
        assert_eq!(gesture.phase(), GesturePhase::Idle);
    }

    #[test]
    fn test_single_contact_move_emits_nothing() {
        let mut gesture = GestureInterpreter::new();
        gesture.contact_down(1, Point::new(100.0, 100.0));
        assert!(gesture.contact_move(1, Point::new(150.0, 120.0)).is_none());
    }

    #[test]
    fn test_pinch_emits_multiplicative_factor_and_midpoint_anchor() {
        let mut gesture = GestureInterpreter::new();
        gesture.contact_down(1, Point::new(100.0, 100.0));
        gesture.contact_down(2, Point::new(200.0, 100.0)); // distance 100

        let intent = gesture
            .contact_move(2, Point::new(300.0, 100.0)) // distance 200
            .expect("past jitter threshold");

        match intent {
            GestureIntent::PinchZoom { factor, anchor } => {
                assert!((factor - 2.0).abs() < 1e-12);
                assert!((anchor.x - 200.0).abs() < f64::EPSILON);
                assert!((anchor.y - 100.0).abs() < f64::EPSILON);
            }
            other => panic!("expected pinch intent, got {:?}", other),
        }
    }

    #[test]
    fn test_jitter_below_threshold_is_suppressed() {
        let mut gesture = GestureInterpreter::new();
        gesture.contact_down(1, Point::new(100.0, 100.0));
        gesture.contact_down(2, Point::new(200.0, 100.0)); // distance 100

        // 9px change: below the 10px jitter threshold
        assert!(gesture.contact_move(2, Point::new(209.0, 100.0)).is_none());
        // Still measured against the last recorded distance (100), so a
        // cumulative 15px change now fires
        assert!(gesture.contact_move(2, Point::new(215.0, 100.0)).is_some());
    }

    #[test]
    fn test_factor_relative_to_last_emitted_distance() {
        let mut gesture = GestureInterpreter::new();
        gesture.contact_down(1, Point::new(0.0, 0.0));
        gesture.contact_down(2, Point::new(100.0, 0.0));

        let first = gesture.contact_move(2, Point::new(150.0, 0.0)).unwrap();
        let second = gesture.contact_move(2, Point::new(300.0, 0.0)).unwrap();

        let (GestureIntent::PinchZoom { factor: f1, .. }, GestureIntent::PinchZoom { factor: f2, .. }) =
            (first, second)
        else {
            panic!("expected pinch intents");
        };
        assert!((f1 - 1.5).abs() < 1e-12);
        assert!((f2 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_pinch_cancelled_when_contact_lifts() {
        let mut gesture = GestureInterpreter::new();
        gesture.contact_down(1, Point::new(100.0, 100.0));
        gesture.contact_down(2, Point::new(200.0, 100.0));
        gesture.contact_up(2);

        // Re-pinch starts from a fresh baseline, not the old distance
        gesture.contact_down(2, Point::new(400.0, 100.0)); // distance 300
        assert!(gesture.contact_move(2, Point::new(405.0, 100.0)).is_none());

        let intent = gesture.contact_move(2, Point::new(460.0, 100.0)).unwrap();
        let GestureIntent::PinchZoom { factor, .. } = intent else {
            panic!("expected pinch intent");
        };
        assert!((factor - 360.0 / 300.0).abs() < 1e-12);
    }

    #[test]
    fn test_third_contact_does_not_disturb_pinch() {
        let mut gesture = GestureInterpreter::new();
        gesture.contact_down(1, Point::new(0.0, 0.0));
        gesture.contact_down(2, Point::new(100.0, 0.0));
        gesture.contact_down(3, Point::new(500.0, 500.0));

        assert_eq!(gesture.contact_count(), 3);
        // Moving the third contact never changes the first-two distance
        assert!(gesture.contact_move(3, Point::new(600.0, 600.0)).is_none());

        let intent = gesture.contact_move(2, Point::new(200.0, 0.0)).unwrap();
        let GestureIntent::PinchZoom { factor, .. } = intent else {
            panic!("expected pinch intent");
        };
        assert!((factor - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_pinch_rebaselines_when_pair_contact_lifts() {
        let mut gesture = GestureInterpreter::new();
        gesture.contact_down(1, Point::new(0.0, 0.0));
        gesture.contact_down(2, Point::new(100.0, 0.0)); // pair distance 100
        gesture.contact_down(3, Point::new(500.0, 0.0));

        // Lifting a pair contact hands the pinch to contacts 2 and 3
        // (distance 400). A tiny move must not be compared against the old
        // pair's 100px baseline.
        gesture.contact_up(1);
        assert!(gesture.is_pinching());
        assert!(gesture.contact_move(3, Point::new(501.0, 0.0)).is_none());

        // Past the jitter threshold, the factor is relative to the new pair
        let intent = gesture.contact_move(3, Point::new(600.0, 0.0)).unwrap();
        let GestureIntent::PinchZoom { factor, .. } = intent else {
            panic!("expected pinch intent");
        };
        assert!((factor - 500.0 / 400.0).abs() < 1e-12);
    }

    #[test]
    fn test_trailing_contact_lift_keeps_pinch_baseline() {
        let mut gesture = GestureInterpreter::new();
        gesture.contact_down(1, Point::new(0.0, 0.0));
        gesture.contact_down(2, Point::new(100.0, 0.0));
        gesture.contact_down(3, Point::new(500.0, 0.0));

        // Accumulate 9px of sub-threshold movement on the pair
        assert!(gesture.contact_move(2, Point::new(109.0, 0.0)).is_none());

        // Lifting the third contact leaves the pair untouched, so the
        // accumulated drift still counts toward the threshold
        gesture.contact_up(3);
        let intent = gesture.contact_move(2, Point::new(115.0, 0.0)).unwrap();
        let GestureIntent::PinchZoom { factor, .. } = intent else {
            panic!("expected pinch intent");
        };
        assert!((factor - 1.15).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_contact_move_is_ignored() {
        let mut gesture = GestureInterpreter::new();
        gesture.contact_down(1, Point::new(0.0, 0.0));
        assert!(gesture.contact_move(99, Point::new(10.0, 10.0)).is_none());
    }

    #[test]
    fn test_scroll_pan() {
        let gesture = GestureInterpreter::new();
        let intent = gesture.scroll_pan(Vec2::new(0.0, -30.0));
        assert_eq!(intent, GestureIntent::Pan(Vec2::new(0.0, -30.0)));
    }

    #[test]
    fn test_reset() {
        let mut gesture = GestureInterpreter::new();
        gesture.contact_down(1, Point::new(0.0, 0.0));
        gesture.contact_down(2, Point::new(100.0, 0.0));
        gesture.reset();
        assert_eq!(gesture.phase(), GesturePhase::Idle);
    }
}
