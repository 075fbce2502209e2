//! A leaf that shows a text layout.

use crate::color::Color;
use crate::graphics::{Brush, Font, Painter, TextHitTestResult, TextLayout, TextRange, TransformGuard};
use crate::rect::{translation, Point, Rect};
use crate::render_object::{ChildMode, Frame, Hit, RenderKind, RenderObject};
use crate::size::{Size, INFINITE_LENGTH};
use cgmath::EuclideanSpace;

/// Draws text, with an optional selection highlighted behind it.
///
/// Shaping and measuring are left to the [`TextLayout`].
#[derive(Debug)]
pub struct TextRenderObject {
    layout: Box<dyn TextLayout>,
    brush: Brush,
    selection_brush: Brush,
    selection: Option<TextRange>,
}

impl TextRenderObject {
    pub fn new(layout: Box<dyn TextLayout>, brush: Brush) -> TextRenderObject {
        TextRenderObject {
            layout,
            brush,
            selection_brush: Brush::solid(Color::rgba(0., 0.47, 0.84, 0.4)),
            selection: None,
        }
    }

    pub fn text(&self) -> &str {
        self.layout.text()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.layout.set_text(text.into());
    }

    pub fn font(&self) -> &Font {
        self.layout.font()
    }

    pub fn set_font(&mut self, font: Font) {
        self.layout.set_font(font);
    }

    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    pub fn set_brush(&mut self, brush: Brush) {
        self.brush = brush;
    }

    pub fn selection_brush(&self) -> &Brush {
        &self.selection_brush
    }

    pub fn set_selection_brush(&mut self, brush: Brush) {
        self.selection_brush = brush;
    }

    pub fn selection(&self) -> Option<TextRange> {
        self.selection
    }

    pub fn set_selection(&mut self, selection: Option<TextRange>) {
        self.selection = selection;
    }

    /// Rects covering `range`, relative to the text origin.
    pub fn text_range_rects(&self, range: TextRange) -> Vec<Rect> {
        self.layout.text_range_rects(range)
    }

    pub fn caret_point(&self, position: usize, trailing: bool) -> Point {
        self.layout.caret_point(position, trailing)
    }

    /// Hit-tests a point relative to the text origin.
    pub fn text_hit_test(&self, point: Point) -> TextHitTestResult {
        self.layout.hit_test(point)
    }

    pub fn layout(&self) -> &dyn TextLayout {
        &*self.layout
    }
}

impl RenderKind for TextRenderObject {
    fn name(&self) -> &str {
        "text"
    }

    fn child_mode(&self) -> ChildMode {
        ChildMode::None
    }

    fn measure_content(&mut self, _children: &mut [RenderObject], available: Size) -> Size {
        self.layout.set_max_width(available.width);
        // shape the full text, then clamp to what fits
        self.layout.set_max_height(INFINITE_LENGTH);
        self.layout
            .text_bounds()
            .size
            .at_least_zero()
            .coerce_into(available)
    }

    fn layout_content(&mut self, _children: &mut [RenderObject], content_rect: Rect) {
        self.layout.set_max_width(content_rect.width());
        self.layout.set_max_height(content_rect.height());
    }

    fn draw(&self, frame: &Frame, _children: &[RenderObject], painter: &mut dyn Painter) {
        let origin = frame.content_rect(self.border_thickness()).origin;
        let mut painter = TransformGuard::new(painter, translation(origin.to_vec()));
        if let Some(selection) = self.selection {
            for rect in self.layout.text_range_rects(selection) {
                painter.fill_rectangle(rect, &self.selection_brush);
            }
        }
        painter.draw_text(Point::origin(), &*self.layout, &self.brush);
    }

    fn hit_test<'a>(&self, frame: &Frame, _children: &'a [RenderObject], point: Point) -> Hit<'a> {
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
    use crate::graphics::GraphicsFactory;
    use crate::headless::{DrawCommand, HeadlessGraphicsFactory, RecordingPainter};
    use crate::size::Thickness;

    fn text_node(text: &str) -> RenderObject {
        let factory = HeadlessGraphicsFactory::new();
        let layout = factory.create_text_layout(Font::new("mono", 10.), text);
        RenderObject::new(TextRenderObject::new(layout, Brush::solid(Color::BLACK)))
    }

    #[test]
    fn measures_through_the_text_layout() {
        let mut node = text_node("hello");
        node.measure(Size::infinite());
        // 5 characters, 5 units wide and 10 tall each
        assert_eq!(node.preferred_size(), Size::new(25., 10.));
    }

    #[test]
    fn wraps_to_the_available_width() {
        let mut node = text_node("hello world");
        node.measure(Size::new(30., 100.));
        assert_eq!(node.preferred_size(), Size::new(30., 20.));
    }

    #[test]
    fn wrapped_text_is_clamped_to_a_short_height() {
        let mut node = text_node("hello world");
        node.measure(Size::new(30., 5.));
        assert_eq!(node.preferred_size(), Size::new(30., 5.));

        node.layout_at(Point::origin());
        assert_eq!(node.size(), Size::new(30., 5.));
    }

    #[test]
    fn selection_is_drawn_behind_the_text() {
        let mut node = text_node("hello").with_padding(Thickness::new(2., 3., 0., 0.));
        node.update_kind::<TextRenderObject, _>(|text| text.set_selection(Some(TextRange::new(1, 2))));
        node.measure(Size::infinite());
        node.layout_at(Point::origin());

        let mut painter = RecordingPainter::new();
        node.draw(&mut painter);
        let commands = painter.commands();
        assert_eq!(commands.len(), 2);
        match &commands[0] {
            DrawCommand::FillRectangle { rect, transform, .. } => {
                assert_eq!(*rect, Rect::from_ltwh(5., 0., 10., 10.));
                assert_eq!((transform.z.x, transform.z.y), (2., 3.));
            }
            other => panic!("expected the selection first, got {:?}", other),
        }
        match &commands[1] {
            DrawCommand::Text { text, .. } => assert_eq!(text, "hello"),
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn hit_test_covers_the_padding_rect() {
        let mut node = text_node("hi").with_margin(Thickness::uniform(4.));
        node.measure(Size::infinite());
        node.layout_at(Point::origin());
        assert!(node.hit_test(Point::new(2., 2.)).is_none());
        assert!(node.hit_test(Point::new(5., 5.)).is_some());
    }
}
