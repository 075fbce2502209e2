//! Interfaces to native graphics: painters, brushes and text layouts.
//!
//! The render tree never rasterizes anything itself. It issues drawing commands to a
//! [`Painter`] handed out by the native window for a single paint pass, and leaf render objects
//! delegate text measurement to a [`TextLayout`] created by a [`GraphicsFactory`].

use crate::color::Color;
use crate::rect::{Matrix, Point, Rect};
use crate::shape::Geometry;
use core::fmt;
use std::ops::{Deref, DerefMut};

/// Paint used to fill or stroke shapes and text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Brush {
    Solid(Color),
}

impl Brush {
    pub fn solid(color: Color) -> Brush {
        Brush::Solid(color)
    }
}

/// An opaque handle to an image owned by the native backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(pub u64);

/// A font description.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub family: String,
    pub size: f64,
}

impl Font {
    pub fn new(family: impl Into<String>, size: f64) -> Font {
        Font {
            family: family.into(),
            size,
        }
    }
}

/// A drawing surface for one paint pass.
///
/// Painters are acquired from the native window right before drawing. Implementations must
/// release their native resources (device contexts, surfaces) when dropped, so that a painter is
/// released even if drawing unwinds halfway through.
pub trait Painter {
    /// Returns the current transform.
    fn transform(&self) -> Matrix;

    /// Replaces the current transform.
    fn set_transform(&mut self, matrix: Matrix);

    /// Multiplies the current transform by `matrix`, so `matrix` applies first.
    fn concat_transform(&mut self, matrix: Matrix) {
        let current = self.transform();
        self.set_transform(current * matrix);
    }

    fn clear(&mut self, color: Color);

    fn draw_line(&mut self, start: Point, end: Point, brush: &Brush, width: f64);
    fn stroke_rectangle(&mut self, rect: Rect, brush: &Brush, width: f64);
    fn fill_rectangle(&mut self, rect: Rect, brush: &Brush);
    fn stroke_ellipse(&mut self, outline_rect: Rect, brush: &Brush, width: f64);
    fn fill_ellipse(&mut self, outline_rect: Rect, brush: &Brush);
    fn stroke_geometry(&mut self, geometry: &Geometry, brush: &Brush, width: f64);
    fn fill_geometry(&mut self, geometry: &Geometry, brush: &Brush);
    fn draw_text(&mut self, origin: Point, layout: &dyn TextLayout, brush: &Brush);
    fn draw_image(&mut self, origin: Point, image: ImageId);

    /// Clips all following drawing to `bounds` until the matching `pop_layer`.
    fn push_layer(&mut self, bounds: Rect);
    fn pop_layer(&mut self);

    /// Saves the transform (and any other drawing state) until the matching `pop_state`.
    fn push_state(&mut self);
    fn pop_state(&mut self);

    /// Finishes the paint pass.
    fn end_draw(&mut self);
}

/// Concatenates a transform onto a painter and restores the previous one when dropped.
///
/// Restoration happens on every exit path, including panics in whatever draws through the
/// guard.
pub struct TransformGuard<'a> {
    painter: &'a mut dyn Painter,
    saved: Matrix,
}

impl<'a> TransformGuard<'a> {
    pub fn new(painter: &'a mut dyn Painter, transform: Matrix) -> TransformGuard<'a> {
        let saved = painter.transform();
        painter.set_transform(saved * transform);
        TransformGuard { painter, saved }
    }
}

impl<'a> Deref for TransformGuard<'a> {
    type Target = dyn Painter + 'a;
    fn deref(&self) -> &Self::Target {
        &*self.painter
    }
}

impl<'a> DerefMut for TransformGuard<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.painter
    }
}

impl<'a> Drop for TransformGuard<'a> {
    fn drop(&mut self) {
        self.painter.set_transform(self.saved);
    }
}

/// A range of characters in a text layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
    pub position: usize,
    pub count: usize,
}

impl TextRange {
    pub fn new(position: usize, count: usize) -> TextRange {
        TextRange { position, count }
    }

    pub fn end(&self) -> usize {
        self.position + self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Result of hit-testing a point against a text layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextHitTestResult {
    /// Character index under the point.
    pub position: usize,
    /// Whether the point is on the trailing half of the character.
    pub trailing: bool,
    /// Whether the point is inside the text bounds at all.
    pub inside_text: bool,
}

/// A shaped, measurable piece of text owned by the native text stack.
pub trait TextLayout: fmt::Debug + Send {
    fn text(&self) -> &str;
    fn set_text(&mut self, text: String);

    fn font(&self) -> &Font;
    fn set_font(&mut self, font: Font);

    /// Sets the wrapping width. An unconstrained length disables wrapping.
    fn set_max_width(&mut self, width: f64);
    fn set_max_height(&mut self, height: f64);

    /// Bounds of the laid out text relative to the layout origin.
    fn text_bounds(&self) -> Rect;

    /// Rectangles covering the given range, one per line it touches.
    fn text_range_rects(&self, range: TextRange) -> Vec<Rect>;

    /// Caret position before (or after, if `trailing`) the character at `position`.
    fn caret_point(&self, position: usize, trailing: bool) -> Point;

    fn hit_test(&self, point: Point) -> TextHitTestResult;
}

/// Creates native graphics resources.
pub trait GraphicsFactory {
    fn create_text_layout(&self, font: Font, text: &str) -> Box<dyn TextLayout>;
}
