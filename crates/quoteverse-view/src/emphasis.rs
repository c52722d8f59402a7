//! Similarity → color and size

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Steepness of the emphasis curve
pub const SIGMOID_STEEPNESS: f64 = 10.0;

/// Strength at which emphasis reaches one half
pub const SIGMOID_MIDPOINT: f64 = 0.6;

/// Logistic curve mapping a raw similarity strength onto `(0, 1)`.
///
/// Steep around [`SIGMOID_MIDPOINT`] so weak matches stay close to the
/// baseline and strong ones saturate.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-SIGMOID_STEEPNESS * (x - SIGMOID_MIDPOINT)).exp())
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// An sRGB color with alpha, as used by CSS `rgb()`/`rgba()`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `rgb(r, g, b)` or `rgba(r, g, b, a)`
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let inner = s
            .strip_prefix("rgba(")
            .or_else(|| s.strip_prefix("rgb("))?
            .strip_suffix(')')?;

        let mut parts = inner.split(',').map(str::trim);
        let r = parts.next()?.parse().ok()?;
        let g = parts.next()?.parse().ok()?;
        let b = parts.next()?.parse().ok()?;
        let a = match parts.next() {
            Some(alpha) => alpha.parse().ok()?,
            None => 1.0,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(Self { r, g, b, a })
    }

    /// Linear blend toward `other`; `t = 0` is `self`, `t = 1` is `other`
    pub fn lerp(self, other: Rgba, t: f64) -> Rgba {
        let channel = |a: u8, b: u8| lerp(f64::from(a), f64::from(b), t).round().clamp(0.0, 255.0) as u8;
        Rgba {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
            a: lerp(self.a, other.a, t),
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Rgba {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgba::parse(s).ok_or_else(|| format!("not an rgb()/rgba() color: {}", s))
    }
}

/// Blend two CSS color strings. If either fails to parse, `from` is returned
/// unchanged.
pub fn interpolate_color(from: &str, to: &str, factor: f64) -> String {
    match (Rgba::parse(from), Rgba::parse(to)) {
        (Some(a), Some(b)) => a.lerp(b, factor).to_string(),
        _ => from.to_string(),
    }
}

/// Visual state of one point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Emphasis {
    pub color: Rgba,
    pub scale: f64,
}

/// Baseline and peak appearance that emphasis interpolates between
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmphasisStyle {
    pub baseline_color: Rgba,
    pub peak_color: Rgba,
    pub baseline_scale: f64,
    pub peak_scale: f64,
}

impl Default for EmphasisStyle {
    fn default() -> Self {
        Self {
            baseline_color: Rgba::new(180, 180, 200, 0.45),
            peak_color: Rgba::new(255, 214, 102, 1.0),
            baseline_scale: 1.0,
            peak_scale: 2.5,
        }
    }
}

impl EmphasisStyle {
    pub fn baseline(&self) -> Emphasis {
        Emphasis {
            color: self.baseline_color,
            scale: self.baseline_scale,
        }
    }

    /// Emphasis for a raw similarity strength (`1 - distance`)
    pub fn for_strength(&self, strength: f64) -> Emphasis {
        let smooth = sigmoid(strength);
        Emphasis {
            color: self.baseline_color.lerp(self.peak_color, smooth),
            scale: lerp(self.baseline_scale, self.peak_scale, smooth),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid_shape() {
        assert!((sigmoid(0.6) - 0.5).abs() < 1e-12);
        assert!(sigmoid(1.0) > 0.98);
        assert!(sigmoid(0.0) < 0.01);
        assert!(sigmoid(0.7) > sigmoid(0.65));
    }

    #[test]
    fn test_parse_colors() {
        assert_eq!(Rgba::parse("rgb(10, 20, 30)"), Some(Rgba::new(10, 20, 30, 1.0)));
        assert_eq!(Rgba::parse("rgba(10,20,30,0.5)"), Some(Rgba::new(10, 20, 30, 0.5)));
        assert_eq!(Rgba::parse("#ffffff"), None);
        assert_eq!(Rgba::parse("rgba(1, 2)"), None);
        assert_eq!(Rgba::parse("rgb(300, 0, 0)"), None);
    }

    #[test]
    fn test_interpolate_color() {
        let mid = interpolate_color("rgba(0, 0, 0, 0)", "rgba(200, 100, 50, 1)", 0.5);
        assert_eq!(mid, "rgba(100, 50, 25, 0.5)");

        // Unparsable input falls back to the first color
        assert_eq!(interpolate_color("tomato", "rgb(1, 2, 3)", 0.5), "tomato");
    }

    #[test]
    fn test_emphasis_endpoints() {
        let style = EmphasisStyle::default();

        let strong = style.for_strength(1.0);
        let weak = style.for_strength(0.0);

        assert!(strong.scale > 2.4);
        assert!(weak.scale < 1.02);
        assert_eq!(style.baseline().color, style.baseline_color);
        assert!(strong.color.a > weak.color.a);
    }
}
