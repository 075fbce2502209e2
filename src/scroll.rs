//! A scrolling viewport around a single child.

use crate::graphics::{Painter, TransformGuard};
use crate::rect::{translation, Point, Rect, Vector};
use crate::render_object::{ChildMode, Frame, Hit, RenderKind, RenderObject};
use crate::size::{Size, Thickness};
use cgmath::{EuclideanSpace, Vector2, Zero};

/// Shows a window into a child that may be larger than the viewport.
///
/// The child is measured without constraints and laid out as if it were not scrolled. The scroll
/// offset is a translation applied on top of the child's offset when drawing and hit-testing, so
/// a negative offset moves the content up or left. With an offset of `(0, -20)`, the viewport
/// point `(10, 10)` maps to `(10, 30)` in the child.
#[derive(Debug, Clone)]
pub struct ScrollRenderObject {
    scroll_offset: Vector,
    viewport: Rect,
    extent: Size,
}

impl Default for ScrollRenderObject {
    fn default() -> Self {
        ScrollRenderObject::new()
    }
}

impl ScrollRenderObject {
    pub fn new() -> ScrollRenderObject {
        ScrollRenderObject {
            scroll_offset: Vector2::zero(),
            viewport: Rect::zero(),
            extent: Size::zero(),
        }
    }

    pub fn scroll_offset(&self) -> Vector {
        self.scroll_offset
    }

    /// Sets the offset as is, even outside the scrollable range.
    pub fn set_scroll_offset(&mut self, offset: Vector) {
        self.scroll_offset = offset;
    }

    /// Size of the viewport after the last layout.
    pub fn viewport_size(&self) -> Size {
        self.viewport.size
    }

    /// Size of the child after the last layout.
    pub fn content_extent(&self) -> Size {
        self.extent
    }

    /// The furthest the content can move in each direction, as a non-negative distance.
    pub fn max_scroll(&self) -> Vector {
        Vector2::new(
            (self.extent.width - self.viewport.width()).max(0.),
            (self.extent.height - self.viewport.height()).max(0.),
        )
    }

    fn clamp(&self, offset: Vector) -> Vector {
        let max = self.max_scroll();
        Vector2::new(
            offset.x.min(0.).max(-max.x),
            offset.y.min(0.).max(-max.y),
        )
    }

    /// Moves the content by `delta`, staying inside the scrollable range.
    pub fn scroll_by(&mut self, delta: Vector) {
        self.scroll_offset = self.clamp(self.scroll_offset + delta);
    }

    /// Scrolls as little as possible so that `rect` (in child coordinates), grown by `margin`,
    /// is inside the viewport.
    pub fn scroll_to_contain(&mut self, rect: Rect, margin: Thickness) {
        let target = rect.expand(margin);
        // the visible part of the child, in child coordinates
        let view = Rect::new(Point::origin() - self.scroll_offset, self.viewport.size);

        let mut offset = self.scroll_offset;
        if target.left() < view.left() {
            offset.x = -target.left();
        } else if target.right() > view.right() {
            offset.x = -(target.right() - view.width());
        }
        if target.top() < view.top() {
            offset.y = -target.top();
        } else if target.bottom() > view.bottom() {
            offset.y = -(target.bottom() - view.height());
        }
        self.scroll_offset = self.clamp(offset);
    }

    pub fn can_scroll_left(&self) -> bool {
        self.scroll_offset.x < 0.
    }

    pub fn can_scroll_right(&self) -> bool {
        -self.scroll_offset.x < self.max_scroll().x
    }

    pub fn can_scroll_up(&self) -> bool {
        self.scroll_offset.y < 0.
    }

    pub fn can_scroll_down(&self) -> bool {
        -self.scroll_offset.y < self.max_scroll().y
    }
}

impl RenderKind for ScrollRenderObject {
    fn name(&self) -> &str {
        "scroll"
    }

    fn child_mode(&self) -> ChildMode {
        ChildMode::Single
    }

    fn measure_content(&mut self, children: &mut [RenderObject], available: Size) -> Size {
        match children.first_mut() {
            Some(child) => {
                child.measure(Size::infinite());
                child.preferred_size().coerce_into(available)
            }
            None => Size::zero(),
        }
    }

    fn layout_content(&mut self, children: &mut [RenderObject], content_rect: Rect) {
        self.viewport = content_rect;
        match children.first_mut() {
            Some(child) => {
                child.layout_at(content_rect.origin);
                self.extent = child.size();
            }
            None => self.extent = Size::zero(),
        }
    }

    fn draw(&self, frame: &Frame, children: &[RenderObject], painter: &mut dyn Painter) {
        let child = match children.first() {
            Some(child) => child,
            None => return,
        };

        painter.push_layer(frame.content_rect(self.border_thickness()));
        {
            let mut painter =
                TransformGuard::new(painter, translation(child.offset() + self.scroll_offset));
            child.draw(&mut *painter);
        }
        painter.pop_layer();
    }

    fn hit_test<'a>(&self, frame: &Frame, children: &'a [RenderObject], point: Point) -> Hit<'a> {
        if let Some(child) = children.first() {
            let viewport = frame.content_rect(self.border_thickness());
            if viewport.contains(point) {
                if let Some(node) = child.hit_test(point - child.offset() - self.scroll_offset) {
                    return Hit::Node(node);
                }
            }
        }

        if frame.padding_rect().contains(point) {
            Hit::This
        } else {
            Hit::Miss
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::CanvasRenderObject;
    use crate::headless::{DrawCommand, RecordingPainter};

    fn scroller(child: Size) -> RenderObject {
        RenderObject::new(ScrollRenderObject::new())
            .with_child(RenderObject::new(CanvasRenderObject::new(child)))
            .unwrap()
    }

    fn run(node: &mut RenderObject, rect: Rect) {
        node.measure(rect.size);
        node.layout(rect);
    }

    #[test]
    fn child_is_measured_unconstrained() {
        let mut node = scroller(Size::new(50., 300.));
        run(&mut node, Rect::from_ltwh(0., 0., 100., 100.));
        assert_eq!(node.preferred_size(), Size::new(50., 100.));
        assert_eq!(node.children()[0].size(), Size::new(50., 300.));
    }

    #[test]
    fn scroll_offset_shifts_hit_testing_only() {
        let mut node = scroller(Size::new(50., 50.));
        run(&mut node, Rect::from_ltwh(0., 0., 50., 50.));
        node.update_kind::<ScrollRenderObject, _>(|scroll| {
            scroll.set_scroll_offset(Vector2::new(0., -20.))
        });

        let child = &node.children()[0];
        assert_eq!(child.offset(), Vector2::new(0., 0.));
        assert_eq!(child.size(), Size::new(50., 50.));

        let scroll = node.kind::<ScrollRenderObject>().unwrap();
        let local = Point::new(10., 10.);
        let in_child = local - child.offset() - scroll.scroll_offset();
        assert_eq!(in_child, Point::new(10., 30.));

        // the bottom 20 units of the child are scrolled out, so the viewport's bottom strip
        // shows nothing
        assert_eq!(node.hit_test(local).map(|n| n.id()), Some(child.id()));
        assert_eq!(
            node.hit_test(Point::new(10., 40.)).map(|n| n.id()),
            Some(node.id())
        );
    }

    #[test]
    fn scroll_by_is_clamped() {
        let mut node = scroller(Size::new(100., 300.));
        run(&mut node, Rect::from_ltwh(0., 0., 100., 100.));
        node.update_kind::<ScrollRenderObject, _>(|scroll| {
            assert!(scroll.can_scroll_down());
            assert!(!scroll.can_scroll_up());
            scroll.scroll_by(Vector2::new(-10., -500.));
            assert_eq!(scroll.scroll_offset(), Vector2::new(0., -200.));
            assert!(!scroll.can_scroll_down());
            scroll.scroll_by(Vector2::new(0., 50.));
            assert_eq!(scroll.scroll_offset(), Vector2::new(0., -150.));
        });
    }

    #[test]
    fn scroll_to_contain_moves_minimally() {
        let mut node = scroller(Size::new(100., 300.));
        run(&mut node, Rect::from_ltwh(0., 0., 100., 100.));
        node.update_kind::<ScrollRenderObject, _>(|scroll| {
            scroll.scroll_to_contain(Rect::from_ltwh(0., 150., 10., 20.), Thickness::zero());
            assert_eq!(scroll.scroll_offset(), Vector2::new(0., -70.));

            scroll.scroll_to_contain(Rect::from_ltwh(0., 40., 10., 20.), Thickness::uniform(5.));
            assert_eq!(scroll.scroll_offset(), Vector2::new(0., -35.));
        });
    }

    #[test]
    fn draw_clips_and_translates() {
        let mut canvas = CanvasRenderObject::new(Size::new(50., 50.));
        canvas.set_paint_handler(|painter, rect| {
            painter.fill_rectangle(rect, &crate::graphics::Brush::solid(crate::Color::BLACK))
        });
        let mut node = RenderObject::new(ScrollRenderObject::new())
            .with_child(RenderObject::new(canvas))
            .unwrap();
        run(&mut node, Rect::from_ltwh(0., 0., 50., 50.));
        node.update_kind::<ScrollRenderObject, _>(|scroll| {
            scroll.set_scroll_offset(Vector2::new(0., -20.))
        });

        let mut painter = RecordingPainter::new();
        node.draw(&mut painter);
        let commands = painter.commands();
        assert!(matches!(commands[0], DrawCommand::PushLayer { .. }));
        match &commands[1] {
            DrawCommand::FillRectangle { transform, .. } => {
                assert_eq!((transform.z.x, transform.z.y), (0., -20.))
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(commands[2], DrawCommand::PopLayer));
    }
}
