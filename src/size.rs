//! Sizes and thicknesses.

use std::ops;

/// A length at or above this value means "no constraint".
pub const INFINITE_LENGTH: f64 = std::f64::MAX;

/// Returns true if the length stands for "unconstrained".
pub fn is_infinite_length(length: f64) -> bool {
    length >= INFINITE_LENGTH
}

/// Subtracts `band` from `length`, leaving unconstrained lengths unconstrained and clamping at 0.
fn shrink_length(length: f64, band: f64) -> f64 {
    if is_infinite_length(length) {
        INFINITE_LENGTH
    } else {
        (length - band).max(0.)
    }
}

fn expand_length(length: f64, band: f64) -> f64 {
    if is_infinite_length(length) {
        INFINITE_LENGTH
    } else {
        length + band
    }
}

/// A two-dimensional size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Size {
        Size { width, height }
    }

    pub const fn zero() -> Size {
        Size::new(0., 0.)
    }

    /// The "unconstrained in both dimensions" sentinel used during measurement.
    pub const fn infinite() -> Size {
        Size::new(INFINITE_LENGTH, INFINITE_LENGTH)
    }

    pub fn is_width_infinite(&self) -> bool {
        is_infinite_length(self.width)
    }

    pub fn is_height_infinite(&self) -> bool {
        is_infinite_length(self.height)
    }

    /// Removes a band from this size.
    ///
    /// Infinite components stay infinite and finite ones never go below zero.
    pub fn shrink(&self, thickness: Thickness) -> Size {
        Size::new(
            shrink_length(self.width, thickness.horizontal_total()),
            shrink_length(self.height, thickness.vertical_total()),
        )
    }

    /// Adds a band to this size. Infinite components stay infinite.
    pub fn expand(&self, thickness: Thickness) -> Size {
        Size::new(
            expand_length(self.width, thickness.horizontal_total()),
            expand_length(self.height, thickness.vertical_total()),
        )
    }

    /// Component-wise minimum.
    pub fn min(&self, other: Size) -> Size {
        Size::new(self.width.min(other.width), self.height.min(other.height))
    }

    /// Component-wise maximum.
    pub fn max(&self, other: Size) -> Size {
        Size::new(self.width.max(other.width), self.height.max(other.height))
    }

    pub fn at_least_zero(&self) -> Size {
        self.max(Size::zero())
    }

    /// Clamps this size into `available`. Unconstrained components never clamp.
    pub fn coerce_into(&self, available: Size) -> Size {
        let clamp = |length: f64, limit: f64| {
            if is_infinite_length(limit) {
                length
            } else {
                length.min(limit)
            }
        };
        Size::new(
            clamp(self.width, available.width),
            clamp(self.height, available.height),
        )
    }
}

impl ops::Add for Size {
    type Output = Size;
    fn add(self, other: Size) -> Size {
        Size::new(self.width + other.width, self.height + other.height)
    }
}

impl ops::Sub for Size {
    type Output = Size;
    fn sub(self, other: Size) -> Size {
        Size::new(self.width - other.width, self.height - other.height)
    }
}

/// Widths of the four sides of a band, e.g. a margin, padding or border.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Thickness {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Thickness {
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Thickness {
        Thickness {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn zero() -> Thickness {
        Thickness::uniform(0.)
    }

    /// The same width on every side.
    pub const fn uniform(width: f64) -> Thickness {
        Thickness::new(width, width, width, width)
    }

    /// `horizontal` on the left and right, `vertical` on the top and bottom.
    pub const fn symmetric(horizontal: f64, vertical: f64) -> Thickness {
        Thickness::new(horizontal, vertical, horizontal, vertical)
    }

    pub fn horizontal_total(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical_total(&self) -> f64 {
        self.top + self.bottom
    }

    pub fn total_size(&self) -> Size {
        Size::new(self.horizontal_total(), self.vertical_total())
    }
}

impl ops::Add for Thickness {
    type Output = Thickness;
    fn add(self, other: Thickness) -> Thickness {
        Thickness::new(
            self.left + other.left,
            self.top + other.top,
            self.right + other.right,
            self.bottom + other.bottom,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shrink_keeps_infinite() {
        let size = Size::new(INFINITE_LENGTH, 30.);
        let shrunk = size.shrink(Thickness::uniform(10.));
        assert!(shrunk.is_width_infinite());
        assert_eq!(shrunk.height, 10.);

        let shrunk = Size::infinite().shrink(Thickness::uniform(5.));
        assert_eq!(shrunk, Size::infinite());
    }

    #[test]
    fn shrink_clamps_at_zero() {
        let shrunk = Size::new(4., 4.).shrink(Thickness::uniform(3.));
        assert_eq!(shrunk, Size::zero());
    }

    #[test]
    fn expand_keeps_infinite() {
        let expanded = Size::new(10., INFINITE_LENGTH).expand(Thickness::symmetric(1., 2.));
        assert_eq!(expanded.width, 12.);
        assert!(expanded.is_height_infinite());
    }

    #[test]
    fn coerce_ignores_unconstrained_limits() {
        let size = Size::new(50., 80.);
        assert_eq!(size.coerce_into(Size::new(INFINITE_LENGTH, 60.)), Size::new(50., 60.));
    }

    #[test]
    fn thickness_totals() {
        let t = Thickness::new(1., 2., 3., 4.);
        assert_eq!(t.horizontal_total(), 4.);
        assert_eq!(t.vertical_total(), 6.);
        assert_eq!(Thickness::symmetric(2., 3.), Thickness::new(2., 3., 2., 3.));
    }
}
