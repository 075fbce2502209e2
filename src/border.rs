//! A border around a single child.

use crate::graphics::{Brush, Painter};
use crate::color::Color;
use crate::rect::{Point, Rect};
use crate::render_object::{
    draw_children, hit_test_children, ChildMode, Frame, Hit, RenderKind, RenderObject,
};
use crate::shape::{CornerRadius, Geometry, RoundedRect};
use crate::size::{Size, Thickness};
use cgmath::Vector2;

/// Appearance of a border.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderStyle {
    pub brush: Brush,
    pub thickness: Thickness,
    pub corner_radius: CornerRadius,
    /// Fills the area inside the border.
    pub background: Option<Brush>,
}

impl Default for BorderStyle {
    fn default() -> Self {
        BorderStyle {
            brush: Brush::solid(Color::BLACK),
            thickness: Thickness::uniform(1.),
            corner_radius: CornerRadius::zero(),
            background: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct BorderGeometry {
    size: Size,
    margin: Thickness,
    outer: RoundedRect,
    inner: RoundedRect,
}

impl BorderGeometry {
    fn build(style: &BorderStyle, frame: &Frame) -> BorderGeometry {
        let outer_rect = frame.padding_rect();
        let inner_rect = outer_rect.shrink(style.thickness).at_least_zero();

        let r = style.corner_radius;
        let t = style.thickness;
        let inset = |radius: cgmath::Vector2<f64>, dx: f64, dy: f64| {
            Vector2::new((radius.x - dx).max(0.), (radius.y - dy).max(0.))
        };
        let inner_radius = CornerRadius {
            left_top: inset(r.left_top, t.left, t.top),
            right_top: inset(r.right_top, t.right, t.top),
            left_bottom: inset(r.left_bottom, t.left, t.bottom),
            right_bottom: inset(r.right_bottom, t.right, t.bottom),
        };

        BorderGeometry {
            size: frame.size,
            margin: frame.margin,
            outer: RoundedRect::new(outer_rect, r),
            inner: RoundedRect::new(inner_rect, inner_radius),
        }
    }

    fn matches(&self, frame: &Frame) -> bool {
        self.size == frame.size && self.margin == frame.margin
    }

    fn ring(&self) -> Geometry {
        Geometry::Ring {
            outer: self.outer,
            inner: self.inner,
        }
    }
}

/// Draws a (possibly rounded) border and lays out its child inside it.
///
/// The border band sits between the margin and the padding. A disabled border takes no space and
/// draws nothing but its background.
#[derive(Debug, Clone)]
pub struct BorderRenderObject {
    style: BorderStyle,
    enabled: bool,
    geometry: Option<BorderGeometry>,
}

impl BorderRenderObject {
    pub fn new(style: BorderStyle) -> BorderRenderObject {
        BorderRenderObject {
            style,
            enabled: true,
            geometry: None,
        }
    }

    pub fn style(&self) -> &BorderStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: BorderStyle) {
        self.style = style;
        self.geometry = None;
    }

    pub fn set_thickness(&mut self, thickness: Thickness) {
        self.style.thickness = thickness;
        self.geometry = None;
    }

    pub fn set_corner_radius(&mut self, radius: CornerRadius) {
        self.style.corner_radius = radius;
        self.geometry = None;
    }

    pub fn set_brush(&mut self, brush: Brush) {
        self.style.brush = brush;
    }

    pub fn set_background(&mut self, background: Option<Brush>) {
        self.style.background = background;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Geometry cached by the last layout. Style changes drop it until the next layout.
    pub fn cached_geometry(&self) -> Option<(RoundedRect, RoundedRect)> {
        self.geometry.map(|geometry| (geometry.outer, geometry.inner))
    }

    /// Rebuilds the cached geometry for `frame`.
    pub fn refresh(&mut self, frame: &Frame) {
        self.geometry = Some(BorderGeometry::build(&self.style, frame));
    }

    fn geometry_for(&self, frame: &Frame) -> BorderGeometry {
        match self.geometry {
            Some(geometry) if geometry.matches(frame) => geometry,
            _ => BorderGeometry::build(&self.style, frame),
        }
    }
}

impl RenderKind for BorderRenderObject {
    fn name(&self) -> &str {
        "border"
    }

    fn child_mode(&self) -> ChildMode {
        ChildMode::Single
    }

    fn border_thickness(&self) -> Thickness {
        if self.enabled {
            self.style.thickness
        } else {
            Thickness::zero()
        }
    }

    fn measure_content(&mut self, children: &mut [RenderObject], available: Size) -> Size {
        match children.first_mut() {
            Some(child) => {
                child.measure(available);
                child.preferred_size()
            }
            None => Size::zero(),
        }
    }

    fn layout_content(&mut self, children: &mut [RenderObject], content_rect: Rect) {
        if let Some(child) = children.first_mut() {
            child.layout(content_rect);
        }
    }

    fn draw(&self, frame: &Frame, children: &[RenderObject], painter: &mut dyn Painter) {
        let geometry = self.geometry_for(frame);
        if self.enabled {
            if let Some(background) = &self.style.background {
                painter.fill_geometry(&Geometry::RoundedRect(geometry.inner), background);
            }
            painter.fill_geometry(&geometry.ring(), &self.style.brush);
        } else if let Some(background) = &self.style.background {
            painter.fill_geometry(&Geometry::RoundedRect(geometry.outer), background);
        }
        draw_children(children, painter);
    }

    fn hit_test<'a>(&self, frame: &Frame, children: &'a [RenderObject], point: Point) -> Hit<'a> {
        if let Some(node) = hit_test_children(children, point) {
            return Hit::Node(node);
        }

        let inside = if self.enabled {
            self.geometry_for(frame).outer.contains(point)
        } else {
            frame.padding_rect().contains(point)
        };
        if inside {
            Hit::This
        } else {
            Hit::Miss
        }
    }

    fn on_resize(&mut self, frame: &Frame) {
        self.refresh(frame);
    }

    fn on_layout(&mut self, frame: &Frame) {
        match self.geometry {
            Some(geometry) if geometry.matches(frame) => {}
            _ => self.refresh(frame),
        }
    }
}
