//! Rectangles and the point/vector/matrix types they are built from.

use crate::size::{Size, Thickness};
use cgmath::{Matrix3, Point2, Vector2};
use std::ops;

/// A point in some local coordinate space.
pub type Point = Point2<f64>;

/// An offset between two points.
pub type Vector = Vector2<f64>;

/// A 2D affine transform (column-major; translation lives in the third column).
pub type Matrix = Matrix3<f64>;

/// Returns a matrix that translates by `offset`.
pub fn translation(offset: Vector) -> Matrix {
    Matrix3::new(1., 0., 0., 0., 1., 0., offset.x, offset.y, 1.)
}

/// A rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Top left corner.
    pub origin: Point,

    /// Rectangle size.
    pub size: Size,
}

impl Rect {
    /// Creates a new rectangle.
    pub fn new(origin: Point, size: Size) -> Rect {
        Rect { origin, size }
    }

    /// Creates a new rectangle from its left, top, width and height.
    pub fn from_ltwh(left: f64, top: f64, width: f64, height: f64) -> Rect {
        Rect {
            origin: Point2::new(left, top),
            size: Size::new(width, height),
        }
    }

    /// Returns a zero-sized rectangle at the origin.
    pub fn zero() -> Rect {
        Rect::from_ltwh(0., 0., 0., 0.)
    }

    pub fn left(&self) -> f64 {
        self.origin.x
    }

    pub fn top(&self) -> f64 {
        self.origin.y
    }

    pub fn width(&self) -> f64 {
        self.size.width
    }

    pub fn height(&self) -> f64 {
        self.size.height
    }

    pub fn right(&self) -> f64 {
        self.origin.x + self.size.width
    }

    pub fn bottom(&self) -> f64 {
        self.origin.y + self.size.height
    }

    pub fn left_top(&self) -> Point {
        self.origin
    }

    pub fn right_top(&self) -> Point {
        Point2::new(self.right(), self.top())
    }

    pub fn left_bottom(&self) -> Point {
        Point2::new(self.left(), self.bottom())
    }

    pub fn right_bottom(&self) -> Point {
        Point2::new(self.right(), self.bottom())
    }

    /// Returns the center point.
    pub fn center(&self) -> Point {
        Point2::new(
            self.origin.x + self.size.width / 2.,
            self.origin.y + self.size.height / 2.,
        )
    }

    /// Returns true if the point is inside the rectangle.
    ///
    /// The left and top edges are inside, the right and bottom edges are not.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left()
            && point.y >= self.top()
            && point.x < self.right()
            && point.y < self.bottom()
    }

    /// Returns true if the two rectangles intersect.
    pub fn intersects(&self, rect: Rect) -> bool {
        self.left() < rect.right()
            && self.top() < rect.bottom()
            && rect.left() < self.right()
            && rect.top() < self.bottom()
    }

    /// Returns the intersection rectangle.
    pub fn intersect(&self, rect: Rect) -> Option<Rect> {
        if !self.intersects(rect) {
            return None;
        }

        let min_x = self.left().max(rect.left());
        let min_y = self.top().max(rect.top());
        let max_x = self.right().min(rect.right());
        let max_y = self.bottom().min(rect.bottom());

        Some(Rect::from_ltwh(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// Returns a new rectangle with the given band removed from each side.
    ///
    /// The result may have a negative size; callers that need a valid rectangle should use
    /// [`Rect::at_least_zero`].
    pub fn shrink(&self, thickness: Thickness) -> Rect {
        Rect::from_ltwh(
            self.left() + thickness.left,
            self.top() + thickness.top,
            self.width() - thickness.horizontal_total(),
            self.height() - thickness.vertical_total(),
        )
    }

    /// Returns a new rectangle with the given band added to each side.
    pub fn expand(&self, thickness: Thickness) -> Rect {
        Rect::from_ltwh(
            self.left() - thickness.left,
            self.top() - thickness.top,
            self.width() + thickness.horizontal_total(),
            self.height() + thickness.vertical_total(),
        )
    }

    /// Clamps negative dimensions to zero, keeping the origin.
    pub fn at_least_zero(&self) -> Rect {
        Rect {
            origin: self.origin,
            size: self.size.at_least_zero(),
        }
    }

    /// Returns a new rectangle with the given origin.
    pub fn with_origin(&self, origin: Point) -> Rect {
        Rect {
            origin,
            size: self.size,
        }
    }

    /// Returns a new rectangle with the given size.
    pub fn with_size(&self, size: Size) -> Rect {
        Rect {
            origin: self.origin,
            size,
        }
    }
}

impl ops::Add<Vector> for Rect {
    type Output = Rect;
    fn add(self, offset: Vector) -> Rect {
        Rect {
            origin: self.origin + offset,
            size: self.size,
        }
    }
}

impl ops::Sub<Vector> for Rect {
    type Output = Rect;
    fn sub(self, offset: Vector) -> Rect {
        Rect {
            origin: self.origin - offset,
            size: self.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    #[test]
    fn contains_is_half_open() {
        let rect = Rect::from_ltwh(10., 10., 20., 20.);
        assert!(rect.contains(Point2::new(10., 10.)));
        assert!(rect.contains(Point2::new(29.9, 29.9)));
        assert!(!rect.contains(Point2::new(30., 15.)));
        assert!(!rect.contains(Point2::new(15., 30.)));
        assert!(!rect.contains(Point2::new(9.9, 15.)));
    }

    #[test]
    fn shrink_removes_band() {
        let rect = Rect::from_ltwh(0., 0., 100., 50.);
        let shrunk = rect.shrink(Thickness::new(1., 2., 3., 4.));
        assert_eq!(shrunk, Rect::from_ltwh(1., 2., 96., 44.));
        assert_eq!(shrunk.expand(Thickness::new(1., 2., 3., 4.)), rect);
    }

    #[test]
    fn intersection() {
        let a = Rect::from_ltwh(0., 0., 10., 10.);
        let b = Rect::from_ltwh(5., 5., 10., 10.);
        assert_eq!(a.intersect(b), Some(Rect::from_ltwh(5., 5., 5., 5.)));
        assert_eq!(a.intersect(Rect::from_ltwh(10., 0., 5., 5.)), None);
    }

    #[test]
    fn translation_matrix_moves_points() {
        let m = translation(Vector2::new(3., -2.));
        let p = m * Vector3::new(1., 1., 1.);
        assert_eq!((p.x, p.y), (4., -1.));
    }
}
