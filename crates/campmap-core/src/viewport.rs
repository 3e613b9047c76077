//! Viewport transform between screen and logical map coordinates.

use crate::events::{EventEmitter, Subscription};
use kurbo::{Point, Rect, Size, Vec2};

/// Minimum allowed zoom level.
pub const MIN_ZOOM: f64 = 0.1;
/// Maximum allowed zoom level.
pub const MAX_ZOOM: f64 = 10.0;

/// Snapshot emitted to observers after any viewport mutation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportEvent {
    pub zoom: f64,
    pub offset: Vec2,
}

/// Viewport manages the view transform for the editor surface.
///
/// It handles panning (translation) and zooming (scaling) operations,
/// converting between screen coordinates and logical map coordinates.
/// Zoom is always clamped to `[MIN_ZOOM, MAX_ZOOM]`; the pan offset is
/// unbounded.
#[derive(Debug)]
pub struct Viewport {
    /// Current translation offset (pan), in screen pixels.
    offset: Vec2,
    /// Current zoom level.
    zoom: f64,
    /// Size of the rendering surface in screen pixels.
    size: Size,
    listeners: EventEmitter<ViewportEvent>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            size: Size::ZERO,
            listeners: EventEmitter::new(),
        }
    }
}

impl Viewport {
    /// Create a new viewport with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new viewport with the given surface size.
    pub fn with_size(size: Size) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Current zoom level.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Current pan offset in screen pixels.
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Current surface size in screen pixels.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Convert a screen point to logical map coordinates.
    pub fn screen_to_logical(&self, screen_point: Point) -> Point {
        Point::new(
            (screen_point.x - self.offset.x) / self.zoom,
            (screen_point.y - self.offset.y) / self.zoom,
        )
    }

    /// Convert a logical map point to screen coordinates.
    pub fn logical_to_screen(&self, logical_point: Point) -> Point {
        Point::new(
            logical_point.x * self.zoom + self.offset.x,
            logical_point.y * self.zoom + self.offset.y,
        )
    }

    /// The logical-space rectangle currently covered by the screen.
    pub fn visible_rect(&self) -> Rect {
        let top_left = self.screen_to_logical(Point::ZERO);
        let bottom_right =
            self.screen_to_logical(Point::new(self.size.width, self.size.height));
        Rect::from_points(top_left, bottom_right)
    }

    /// Set the zoom level, keeping the given screen point fixed.
    ///
    /// The logical point under `anchor_screen` before the change remains
    /// under it afterwards (zoom-to-cursor).
    pub fn set_zoom(&mut self, new_zoom: f64, anchor_screen: Point) {
        let new_zoom = new_zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let anchor = anchor_screen.to_vec2();
        let ratio = new_zoom / self.zoom;
        self.offset = anchor - (anchor - self.offset) * ratio;
        self.zoom = new_zoom;
        self.notify();
    }

    /// Apply a multiplicative zoom factor anchored at a screen point.
    /// This is the entry point for pinch-zoom intents.
    pub fn zoom_by(&mut self, factor: f64, anchor_screen: Point) {
        self.set_zoom(self.zoom * factor, anchor_screen);
    }

    /// Pan the viewport by a delta in screen coordinates. Unbounded.
    pub fn pan(&mut self, delta_screen: Vec2) {
        self.offset += delta_screen;
        self.notify();
    }

    /// Update the surface size after a host resize.
    pub fn resize(&mut self, size: Size) {
        self.size = size;
        self.notify();
    }

    /// Reset pan and zoom to defaults.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = 1.0;
        self.notify();
    }

    /// Register an observer invoked after every viewport mutation.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&ViewportEvent) + 'static,
    ) -> Subscription {
        self.listeners.subscribe(listener)
    }

    /// Remove a previously registered observer.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.listeners.unsubscribe(subscription)
    }

    fn notify(&mut self) {
        let event = ViewportEvent {
            zoom: self.zoom,
            offset: self.offset,
        };
        self.listeners.emit(&event);
    }
}
