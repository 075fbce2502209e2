//! Shapes handed to painters as geometries.

use crate::rect::{Point, Rect, Vector};
use cgmath::{Vector2, Zero};

/// Per-corner radii. Each corner has an x and a y radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerRadius {
    pub left_top: Vector,
    pub right_top: Vector,
    pub left_bottom: Vector,
    pub right_bottom: Vector,
}

impl CornerRadius {
    pub fn zero() -> CornerRadius {
        CornerRadius::uniform(0.)
    }

    /// A circular radius on every corner.
    pub fn uniform(radius: f64) -> CornerRadius {
        let v = Vector2::new(radius, radius);
        CornerRadius {
            left_top: v,
            right_top: v,
            left_bottom: v,
            right_bottom: v,
        }
    }

    /// Clamps every radius to half the rectangle size so corners never overlap.
    fn fit(&self, rect: Rect) -> CornerRadius {
        let max_x = (rect.width() / 2.).max(0.);
        let max_y = (rect.height() / 2.).max(0.);
        let fit = |v: Vector| Vector2::new(v.x.min(max_x).max(0.), v.y.min(max_y).max(0.));
        CornerRadius {
            left_top: fit(self.left_top),
            right_top: fit(self.right_top),
            left_bottom: fit(self.left_bottom),
            right_bottom: fit(self.right_bottom),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.left_top.is_zero()
            && self.right_top.is_zero()
            && self.left_bottom.is_zero()
            && self.right_bottom.is_zero()
    }
}

impl Default for CornerRadius {
    fn default() -> Self {
        CornerRadius::zero()
    }
}

/// A rectangle with rounded corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundedRect {
    pub rect: Rect,
    pub radius: CornerRadius,
}

/// Checks whether `point` lies inside the ellipse quadrant around `center`.
fn in_corner(point: Point, center: Point, radius: Vector) -> bool {
    let dx = (point.x - center.x) / radius.x;
    let dy = (point.y - center.y) / radius.y;
    dx * dx + dy * dy <= 1.
}

impl RoundedRect {
    pub fn new(rect: Rect, radius: CornerRadius) -> RoundedRect {
        RoundedRect { rect, radius }
    }

    pub fn contains(&self, point: Point) -> bool {
        let rect = self.rect;
        if !rect.contains(point) {
            return false;
        }

        let r = self.radius.fit(rect);
        let corners = [
            (r.left_top, Point::new(rect.left() + r.left_top.x, rect.top() + r.left_top.y)),
            (r.right_top, Point::new(rect.right() - r.right_top.x, rect.top() + r.right_top.y)),
            (
                r.left_bottom,
                Point::new(rect.left() + r.left_bottom.x, rect.bottom() - r.left_bottom.y),
            ),
            (
                r.right_bottom,
                Point::new(rect.right() - r.right_bottom.x, rect.bottom() - r.right_bottom.y),
            ),
        ];

        for (radius, center) in corners.iter() {
            if radius.x <= 0. || radius.y <= 0. {
                continue;
            }
            let outside_x = if center.x <= rect.center().x {
                point.x < center.x
            } else {
                point.x > center.x
            };
            let outside_y = if center.y <= rect.center().y {
                point.y < center.y
            } else {
                point.y > center.y
            };
            if outside_x && outside_y && !in_corner(point, *center, *radius) {
                return false;
            }
        }
        true
    }
}

/// A fillable shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    RoundedRect(RoundedRect),
    /// The area inside `outer` but not inside `inner`.
    Ring {
        outer: RoundedRect,
        inner: RoundedRect,
    },
}

impl Geometry {
    /// Returns true if filling this geometry would cover `point`.
    pub fn fill_contains(&self, point: Point) -> bool {
        match self {
            Geometry::RoundedRect(shape) => shape.contains(point),
            Geometry::Ring { outer, inner } => outer.contains(point) && !inner.contains(point),
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Geometry::RoundedRect(shape) => shape.rect,
            Geometry::Ring { outer, .. } => outer.rect,
        }
    }
}
