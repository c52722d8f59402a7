//! Quoteverse View - Viewport math, gestures, and visual emphasis
//!
//! Everything in this crate is pure: it maps world coordinates to pixels,
//! folds pointer gestures into pan/zoom updates, and turns similarity scores
//! into colors and sizes. Drawing itself belongs to a rendering adapter.

pub mod emphasis;
pub mod gesture;
pub mod viewport;

pub use emphasis::{sigmoid, Emphasis, EmphasisStyle, Rgba};
pub use gesture::{GestureTracker, ViewEvent};
pub use viewport::ViewportTransform;

/// Pixel or world position; re-exported so callers need not depend on `geo`.
pub use geo::{Coord, Rect};
