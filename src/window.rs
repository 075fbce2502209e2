//! The root of a window's render tree.

use crate::rect::{Point, Rect};
use crate::render_object::{
    hit_test_children, ChildMode, Frame, Hit, RenderKind, RenderObject,
};
use crate::size::{is_infinite_length, Size};

/// Fills the window's client area with its single child.
///
/// When measured against an unconstrained size (a window that fits its content), the window
/// takes its child's preferred size in that dimension.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowRenderObject;

impl WindowRenderObject {
    pub fn new() -> WindowRenderObject {
        WindowRenderObject
    }
}

impl RenderKind for WindowRenderObject {
    fn name(&self) -> &str {
        "window"
    }

    fn child_mode(&self) -> ChildMode {
        ChildMode::Single
    }

    fn measure_content(&mut self, children: &mut [RenderObject], available: Size) -> Size {
        let child = match children.first_mut() {
            Some(child) => {
                child.measure(available);
                child.preferred_size()
            }
            None => Size::zero(),
        };
        let pick = |available: f64, child: f64| {
            if is_infinite_length(available) {
                child
            } else {
                available
            }
        };
        Size::new(
            pick(available.width, child.width),
            pick(available.height, child.height),
        )
    }

    fn layout_content(&mut self, children: &mut [RenderObject], content_rect: Rect) {
        if let Some(child) = children.first_mut() {
            child.layout(content_rect);
        }
    }

    fn hit_test<'a>(&self, frame: &Frame, children: &'a [RenderObject], point: Point) -> Hit<'a> {
        if let Some(node) = hit_test_children(children, point) {
            return Hit::Node(node);
        }
        if frame.local_rect().contains(point) {
            Hit::This
        } else {
            Hit::Miss
        }
    }
}
