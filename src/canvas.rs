//! A leaf drawn by a callback.

use crate::graphics::Painter;
use crate::rect::Rect;
use crate::render_object::{ChildMode, Frame, RenderKind, RenderObject};
use crate::size::Size;
use core::fmt;
use parking_lot::Mutex;
use std::sync::Arc;

/// Paints a canvas. Receives the painter in the node's local space and the content rect.
pub struct PaintHandler(Arc<Mutex<dyn FnMut(&mut dyn Painter, Rect) + Send>>);

impl Clone for PaintHandler {
    fn clone(&self) -> Self {
        PaintHandler(Arc::clone(&self.0))
    }
}

impl PaintHandler {
    pub fn new<F: 'static + FnMut(&mut dyn Painter, Rect) + Send>(handler: F) -> Self {
        PaintHandler(Arc::new(Mutex::new(handler)))
    }

    pub fn call(&self, painter: &mut dyn Painter, content_rect: Rect) {
        let mut handler = self.0.lock();
        (&mut *handler)(painter, content_rect)
    }
}

impl fmt::Debug for PaintHandler {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PaintHandler")
    }
}

/// A custom-drawn leaf with a caller-supplied desired size.
#[derive(Debug, Clone)]
pub struct CanvasRenderObject {
    desired_size: Size,
    paint_handler: Option<PaintHandler>,
}

impl CanvasRenderObject {
    pub fn new(desired_size: Size) -> CanvasRenderObject {
        CanvasRenderObject {
            desired_size,
            paint_handler: None,
        }
    }

    pub fn desired_size(&self) -> Size {
        self.desired_size
    }

    pub fn set_desired_size(&mut self, size: Size) {
        self.desired_size = size;
    }

    pub fn set_paint_handler<F: 'static + FnMut(&mut dyn Painter, Rect) + Send>(&mut self, handler: F) {
        self.paint_handler = Some(PaintHandler::new(handler));
    }

    pub fn clear_paint_handler(&mut self) {
        self.paint_handler = None;
    }
}

impl RenderKind for CanvasRenderObject {
    fn name(&self) -> &str {
        "canvas"
    }

    fn child_mode(&self) -> ChildMode {
        ChildMode::None
    }

    fn measure_content(&mut self, _children: &mut [RenderObject], available: Size) -> Size {
        self.desired_size.coerce_into(available)
    }

    fn layout_content(&mut self, _children: &mut [RenderObject], _content_rect: Rect) {}

    fn draw(&self, frame: &Frame, _children: &[RenderObject], painter: &mut dyn Painter) {
        if let Some(handler) = &self.paint_handler {
            handler.call(painter, frame.content_rect(self.border_thickness()));
        }
    }
}
