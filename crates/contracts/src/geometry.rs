//! Screen-space geometry shared by calibration and attention regions.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle given by its edges.
///
/// Values are in whatever unit the caller is working in; conversion between
/// device-independent and device pixels goes through [`DisplayScale`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Logical-to-device pixel density.
///
/// Writes toward the hardware multiply by the density, reads from the
/// hardware divide by it, so a value survives a write/read round trip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayScale {
    density: f64,
}

impl DisplayScale {
    /// Create a scale; non-positive or non-finite densities fall back to 1.0
    pub fn new(density: f64) -> Self {
        if density.is_finite() && density > 0.0 {
            Self { density }
        } else {
            Self { density: 1.0 }
        }
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    /// Logical units -> device pixels
    #[inline]
    pub fn to_device(&self, value: f64) -> f64 {
        value * self.density
    }

    /// Device pixels -> logical units
    #[inline]
    pub fn to_logical(&self, value: f64) -> f64 {
        value / self.density
    }

    pub fn rect_to_device(&self, rect: Rect) -> Rect {
        Rect::new(
            self.to_device(rect.left),
            self.to_device(rect.top),
            self.to_device(rect.right),
            self.to_device(rect.bottom),
        )
    }

    pub fn rect_to_logical(&self, rect: Rect) -> Rect {
        Rect::new(
            self.to_logical(rect.left),
            self.to_logical(rect.top),
            self.to_logical(rect.right),
            self.to_logical(rect.bottom),
        )
    }
}

impl Default for DisplayScale {
    fn default() -> Self {
        Self { density: 1.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_round_trip_through_scale() {
        let scale = DisplayScale::new(2.75);
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        let back = scale.rect_to_logical(scale.rect_to_device(rect));
        assert!((back.right - 100.0).abs() < 1e-9);
        assert!((back.bottom - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_density_falls_back() {
        assert_eq!(DisplayScale::new(0.0).density(), 1.0);
        assert_eq!(DisplayScale::new(f64::NAN).density(), 1.0);
        assert_eq!(DisplayScale::new(-3.0).density(), 1.0);
    }
}
