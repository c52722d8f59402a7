//! World ↔ pixel mapping under pan and zoom

use geo::{Coord, Rect};
use quoteverse_core::config::ViewportConfig;
use quoteverse_core::models::Coords;

/// Uniform pan+zoom transform from world space onto the screen.
///
/// The mapping is
///
/// ```text
/// px = center.x + x * scale + offset.x
/// py = center.y - y * scale + offset.y
/// ```
///
/// so world `y` grows upward while screen `y` grows downward. `center` is the
/// middle of the container; `offset` accumulates drags and zoom recentering.
/// `scale` always stays within `[min_scale, max_scale]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportTransform {
    scale: f64,
    default_scale: f64,
    min_scale: f64,
    max_scale: f64,
    offset: Coord<f64>,
    center: Coord<f64>,
}

impl ViewportTransform {
    /// Create a viewport centered on `container` at the configured default scale
    pub fn new(config: &ViewportConfig, container: Rect<f64>) -> Self {
        let (min_scale, max_scale) = if config.min_scale <= config.max_scale {
            (config.min_scale, config.max_scale)
        } else {
            (config.max_scale, config.min_scale)
        };
        Self {
            scale: config.default_scale.clamp(min_scale, max_scale),
            default_scale: config.default_scale,
            min_scale,
            max_scale,
            offset: Coord { x: 0.0, y: 0.0 },
            center: container.center(),
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn min_scale(&self) -> f64 {
        self.min_scale
    }

    pub fn max_scale(&self) -> f64 {
        self.max_scale
    }

    pub fn offset(&self) -> Coord<f64> {
        self.offset
    }

    pub fn center(&self) -> Coord<f64> {
        self.center
    }

    /// Map a world position to pixels
    pub fn world_to_pixel(&self, world: Coord<f64>) -> Coord<f64> {
        Coord {
            x: self.center.x + world.x * self.scale + self.offset.x,
            y: self.center.y - world.y * self.scale + self.offset.y,
        }
    }

    /// Inverse of [`world_to_pixel`](Self::world_to_pixel)
    pub fn pixel_to_world(&self, pixel: Coord<f64>) -> Coord<f64> {
        Coord {
            x: (pixel.x - self.center.x - self.offset.x) / self.scale,
            y: (self.center.y + self.offset.y - pixel.y) / self.scale,
        }
    }

    /// Pixel position of a quote's coordinates
    pub fn project(&self, coords: Coords) -> Coord<f64> {
        self.world_to_pixel(Coord { x: coords.x, y: coords.y })
    }

    /// Translate the view by a pixel delta
    pub fn pan(&mut self, delta: Coord<f64>) {
        if !(delta.x.is_finite() && delta.y.is_finite()) {
            return;
        }
        self.offset = self.offset + delta;
    }

    /// Zoom by `factor` while keeping the world point under `target` fixed.
    ///
    /// The resulting scale is clamped to the configured bounds. Returns
    /// `false` when nothing changed: the scale was already at the bound in
    /// that direction, or `factor` was not a positive finite number.
    pub fn zoom_toward_point(&mut self, target: Coord<f64>, factor: f64) -> bool {
        if !(factor.is_finite() && factor > 0.0) {
            return false;
        }
        if !(target.x.is_finite() && target.y.is_finite()) {
            return false;
        }

        let old_scale = self.scale;
        let new_scale = (old_scale * factor).clamp(self.min_scale, self.max_scale);
        if new_scale == old_scale {
            return false;
        }

        let actual = new_scale / old_scale;
        let anchor = target - self.center;
        self.offset = self.offset * actual + anchor * (1.0 - actual);
        self.scale = new_scale;
        true
    }

    /// Recompute the pixel origin for a new container size.
    ///
    /// Scale and offset are preserved.
    pub fn resize(&mut self, container: Rect<f64>) {
        self.center = container.center();
    }

    /// Size multiplier for point glyphs at the current zoom, in `[0.5, 2]`
    pub fn point_zoom_scale(&self) -> f64 {
        if self.default_scale <= 0.0 {
            return 1.0;
        }
        (self.scale / self.default_scale).clamp(0.5, 2.0)
    }
}
