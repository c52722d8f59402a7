//! Pointer gesture tracking
//!
//! Translates raw drag, wheel, and two-finger pinch input into calls on a
//! [`ViewportTransform`]. Each handler reports whether the viewport changed
//! so callers know when to reposition points.

use geo::{Coord, Rect};

use crate::viewport::ViewportTransform;

/// Raw input that can move or scale the view
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewEvent {
    /// Primary button pressed at a pixel position
    DragStart(Coord<f64>),
    /// Pointer moved while possibly dragging
    DragMove(Coord<f64>),
    /// Button released or pointer left the container
    DragEnd,
    /// Wheel tick; negative `delta_y` zooms in
    Wheel { delta_y: f64, cursor: Coord<f64> },
    /// Two touches began
    PinchStart(Coord<f64>, Coord<f64>),
    /// Two touches moved
    PinchMove(Coord<f64>, Coord<f64>),
    PinchEnd,
    /// Container bounds changed
    Resize(Rect<f64>),
}

/// Per-gesture state that outlives single events.
///
/// Not thread-safe; owned by whichever task receives input.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    zoom_factor: f64,
    last_drag: Option<Coord<f64>>,
    pinch_distance: Option<f64>,
}

impl GestureTracker {
    /// `zoom_factor` is the per-wheel-tick multiplier (e.g. 1.1)
    pub fn new(zoom_factor: f64) -> Self {
        Self {
            zoom_factor,
            last_drag: None,
            pinch_distance: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.last_drag.is_some()
    }

    /// Apply one event to the viewport. Returns `true` if the viewport moved.
    pub fn handle(&mut self, event: ViewEvent, viewport: &mut ViewportTransform) -> bool {
        match event {
            ViewEvent::DragStart(pos) => {
                self.begin_drag(pos);
                false
            }
            ViewEvent::DragMove(pos) => self.drag_to(pos, viewport),
            ViewEvent::DragEnd => {
                self.end_drag();
                false
            }
            ViewEvent::Wheel { delta_y, cursor } => self.wheel(delta_y, cursor, viewport),
            ViewEvent::PinchStart(a, b) => {
                self.begin_pinch(a, b);
                false
            }
            ViewEvent::PinchMove(a, b) => self.pinch_to(a, b, viewport),
            ViewEvent::PinchEnd => {
                self.pinch_distance = None;
                false
            }
            ViewEvent::Resize(container) => {
                viewport.resize(container);
                true
            }
        }
    }

    pub fn begin_drag(&mut self, pos: Coord<f64>) {
        self.last_drag = Some(pos);
    }

    /// Pan by the delta since the previous drag position
    pub fn drag_to(&mut self, pos: Coord<f64>, viewport: &mut ViewportTransform) -> bool {
        let Some(last) = self.last_drag else {
            return false;
        };
        self.last_drag = Some(pos);

        let delta = pos - last;
        if delta.x == 0.0 && delta.y == 0.0 {
            return false;
        }
        viewport.pan(delta);
        true
    }

    pub fn end_drag(&mut self) {
        self.last_drag = None;
    }

    /// One wheel tick toward or away from the cursor
    pub fn wheel(&self, delta_y: f64, cursor: Coord<f64>, viewport: &mut ViewportTransform) -> bool {
        let factor = if delta_y < 0.0 {
            self.zoom_factor
        } else if delta_y > 0.0 {
            1.0 / self.zoom_factor
        } else {
            return false;
        };
        viewport.zoom_toward_point(cursor, factor)
    }

    pub fn begin_pinch(&mut self, a: Coord<f64>, b: Coord<f64>) {
        self.pinch_distance = Some(touch_distance(a, b));
    }

    /// Zoom by the ratio of the new touch spread to the previous one,
    /// centered on the midpoint of the two touches.
    ///
    /// A zero previous spread cannot produce a ratio; that frame only
    /// records the new spread.
    pub fn pinch_to(&mut self, a: Coord<f64>, b: Coord<f64>, viewport: &mut ViewportTransform) -> bool {
        let distance = touch_distance(a, b);
        let previous = self.pinch_distance.replace(distance);

        match previous {
            Some(prev) if prev > 0.0 && prev.is_finite() => {
                viewport.zoom_toward_point(centroid(a, b), distance / prev)
            }
            _ => {
                tracing::trace!(distance, "ignoring degenerate pinch frame");
                false
            }
        }
    }
}

/// Euclidean distance between two touches
pub fn touch_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Midpoint of two touches
pub fn centroid(a: Coord<f64>, b: Coord<f64>) -> Coord<f64> {
    Coord {
        x: (a.x + b.x) / 2.0,
        y: (a.y + b.y) / 2.0,
    }
}
