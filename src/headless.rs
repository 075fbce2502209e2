//! An in-memory backend.
//!
//! Nothing here touches a real display: [`RecordingPainter`] records drawing commands,
//! [`HeadlessWindow`] hands out recording painters and keeps what they drew, and
//! [`MonospaceTextLayout`] measures text with fixed-width cells. This is what the tests run
//! against, and what a server-side embedder can use to inspect a frame.

use crate::color::Color;
use crate::error::PlatformError;
use crate::graphics::{
    Brush, Font, GraphicsFactory, ImageId, Painter, TextHitTestResult, TextLayout, TextRange,
};
use crate::platform::NativeWindow;
use crate::rect::{Matrix, Point, Rect};
use crate::shape::Geometry;
use crate::size::{is_infinite_length, Size, INFINITE_LENGTH};
use cgmath::SquareMatrix;
use log::warn;
use parking_lot::Mutex;
use std::sync::Arc;

/// A single recorded drawing command, with the transform that was current when it was issued.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Line {
        start: Point,
        end: Point,
        brush: Brush,
        width: f64,
        transform: Matrix,
    },
    StrokeRectangle {
        rect: Rect,
        brush: Brush,
        width: f64,
        transform: Matrix,
    },
    FillRectangle {
        rect: Rect,
        brush: Brush,
        transform: Matrix,
    },
    StrokeEllipse {
        rect: Rect,
        brush: Brush,
        width: f64,
        transform: Matrix,
    },
    FillEllipse {
        rect: Rect,
        brush: Brush,
        transform: Matrix,
    },
    StrokeGeometry {
        geometry: Geometry,
        brush: Brush,
        width: f64,
        transform: Matrix,
    },
    FillGeometry {
        geometry: Geometry,
        brush: Brush,
        transform: Matrix,
    },
    Text {
        origin: Point,
        text: String,
        brush: Brush,
        transform: Matrix,
    },
    Image {
        origin: Point,
        image: ImageId,
        transform: Matrix,
    },
    PushLayer {
        bounds: Rect,
        transform: Matrix,
    },
    PopLayer,
    EndDraw,
}

/// Everything one painter drew, in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PaintRecord {
    pub commands: Vec<DrawCommand>,
    /// Whether `end_draw` was called before the painter was released.
    pub ended: bool,
}

type PaintSink = Arc<Mutex<Vec<PaintRecord>>>;

/// A painter that records commands instead of drawing.
#[derive(Debug)]
pub struct RecordingPainter {
    commands: Vec<DrawCommand>,
    transform: Matrix,
    states: Vec<Matrix>,
    layers: usize,
    ended: bool,
    sink: Option<PaintSink>,
}

impl Default for RecordingPainter {
    fn default() -> Self {
        RecordingPainter::new()
    }
}

impl RecordingPainter {
    pub fn new() -> RecordingPainter {
        RecordingPainter {
            commands: Vec::new(),
            transform: Matrix::identity(),
            states: Vec::new(),
            layers: 0,
            ended: false,
            sink: None,
        }
    }

    /// A painter that hands its record to `sink` when dropped.
    fn with_sink(sink: PaintSink) -> RecordingPainter {
        let mut painter = RecordingPainter::new();
        painter.sink = Some(sink);
        painter
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of layers pushed and not yet popped.
    pub fn layer_depth(&self) -> usize {
        self.layers
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    fn record(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }
}

impl Painter for RecordingPainter {
    fn transform(&self) -> Matrix {
        self.transform
    }

    fn set_transform(&mut self, matrix: Matrix) {
        self.transform = matrix;
    }

    fn clear(&mut self, color: Color) {
        self.record(DrawCommand::Clear(color));
    }

    fn draw_line(&mut self, start: Point, end: Point, brush: &Brush, width: f64) {
        let transform = self.transform;
        self.record(DrawCommand::Line {
            start,
            end,
            brush: *brush,
            width,
            transform,
        });
    }

    fn stroke_rectangle(&mut self, rect: Rect, brush: &Brush, width: f64) {
        let transform = self.transform;
        self.record(DrawCommand::StrokeRectangle {
            rect,
            brush: *brush,
            width,
            transform,
        });
    }

    fn fill_rectangle(&mut self, rect: Rect, brush: &Brush) {
        let transform = self.transform;
        self.record(DrawCommand::FillRectangle {
            rect,
            brush: *brush,
            transform,
        });
    }

    fn stroke_ellipse(&mut self, outline_rect: Rect, brush: &Brush, width: f64) {
        let transform = self.transform;
        self.record(DrawCommand::StrokeEllipse {
            rect: outline_rect,
            brush: *brush,
            width,
            transform,
        });
    }

    fn fill_ellipse(&mut self, outline_rect: Rect, brush: &Brush) {
        let transform = self.transform;
        self.record(DrawCommand::FillEllipse {
            rect: outline_rect,
            brush: *brush,
            transform,
        });
    }

    fn stroke_geometry(&mut self, geometry: &Geometry, brush: &Brush, width: f64) {
        let transform = self.transform;
        self.record(DrawCommand::StrokeGeometry {
            geometry: *geometry,
            brush: *brush,
            width,
            transform,
        });
    }

    fn fill_geometry(&mut self, geometry: &Geometry, brush: &Brush) {
        let transform = self.transform;
        self.record(DrawCommand::FillGeometry {
            geometry: *geometry,
            brush: *brush,
            transform,
        });
    }

    fn draw_text(&mut self, origin: Point, layout: &dyn TextLayout, brush: &Brush) {
        let transform = self.transform;
        self.record(DrawCommand::Text {
            origin,
            text: layout.text().to_string(),
            brush: *brush,
            transform,
        });
    }

    fn draw_image(&mut self, origin: Point, image: ImageId) {
        let transform = self.transform;
        self.record(DrawCommand::Image {
            origin,
            image,
            transform,
        });
    }

    fn push_layer(&mut self, bounds: Rect) {
        let transform = self.transform;
        self.layers += 1;
        self.record(DrawCommand::PushLayer { bounds, transform });
    }

    fn pop_layer(&mut self) {
        if self.layers == 0 {
            warn!("pop_layer without a matching push_layer");
            return;
        }
        self.layers -= 1;
        self.record(DrawCommand::PopLayer);
    }

    fn push_state(&mut self) {
        self.states.push(self.transform);
    }

    fn pop_state(&mut self) {
        match self.states.pop() {
            Some(transform) => self.transform = transform,
            None => warn!("pop_state without a matching push_state"),
        }
    }

    fn end_draw(&mut self) {
        self.ended = true;
        self.record(DrawCommand::EndDraw);
    }
}

impl Drop for RecordingPainter {
    fn drop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.lock().push(PaintRecord {
                commands: std::mem::take(&mut self.commands),
                ended: self.ended,
            });
        }
    }
}

#[derive(Debug)]
struct WindowState {
    client_size: Size,
    mouse_position: Point,
    captured: bool,
    refuse_capture: bool,
    repaint_requests: usize,
    fail_next_paint: bool,
    destroyed: bool,
}

/// A window without a display. Use a [`HeadlessWindowHandle`] to look inside it after handing
/// the window to a host.
#[derive(Debug)]
pub struct HeadlessWindow {
    state: Arc<Mutex<WindowState>>,
    paints: PaintSink,
}

/// A shared view of a [`HeadlessWindow`]'s state.
#[derive(Debug, Clone)]
pub struct HeadlessWindowHandle {
    state: Arc<Mutex<WindowState>>,
    paints: PaintSink,
}

impl HeadlessWindow {
    /// Creates a window with the given client size. A zero size means the host fits the window
    /// to its content.
    pub fn new(client_size: Size) -> HeadlessWindow {
        HeadlessWindow {
            state: Arc::new(Mutex::new(WindowState {
                client_size,
                mouse_position: Point::new(0., 0.),
                captured: false,
                refuse_capture: false,
                repaint_requests: 0,
                fail_next_paint: false,
                destroyed: false,
            })),
            paints: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn handle(&self) -> HeadlessWindowHandle {
        HeadlessWindowHandle {
            state: Arc::clone(&self.state),
            paints: Arc::clone(&self.paints),
        }
    }
}

impl NativeWindow for HeadlessWindow {
    fn client_size(&self) -> Size {
        self.state.lock().client_size
    }

    fn set_client_size(&mut self, size: Size) {
        self.state.lock().client_size = size;
    }

    fn begin_paint(&mut self) -> Result<Box<dyn Painter + '_>, PlatformError> {
        let mut state = self.state.lock();
        if state.destroyed {
            return Err(PlatformError::WindowDestroyed);
        }
        if state.fail_next_paint {
            state.fail_next_paint = false;
            return Err(PlatformError::PainterUnavailable(
                "headless window refused to paint".to_string(),
            ));
        }
        Ok(Box::new(RecordingPainter::with_sink(Arc::clone(
            &self.paints,
        ))))
    }

    fn request_repaint(&mut self) {
        self.state.lock().repaint_requests += 1;
    }

    fn capture_mouse(&mut self) -> bool {
        let mut state = self.state.lock();
        if state.refuse_capture {
            return false;
        }
        state.captured = true;
        true
    }

    fn release_mouse(&mut self) {
        self.state.lock().captured = false;
    }

    fn mouse_position(&self) -> Point {
        self.state.lock().mouse_position
    }
}

impl HeadlessWindowHandle {
    pub fn client_size(&self) -> Size {
        self.state.lock().client_size
    }

    /// Changes the client size as a user resize would. The host still needs a resize event.
    pub fn set_client_size(&self, size: Size) {
        self.state.lock().client_size = size;
    }

    pub fn set_mouse_position(&self, point: Point) {
        self.state.lock().mouse_position = point;
    }

    pub fn is_mouse_captured(&self) -> bool {
        self.state.lock().captured
    }

    /// Makes later capture requests fail.
    pub fn set_refuse_capture(&self, refuse: bool) {
        self.state.lock().refuse_capture = refuse;
    }

    pub fn repaint_requests(&self) -> usize {
        self.state.lock().repaint_requests
    }

    /// Makes the next `begin_paint` fail with [`PlatformError::PainterUnavailable`].
    pub fn fail_next_paint(&self) {
        self.state.lock().fail_next_paint = true;
    }

    /// Marks the native window as gone; painting fails from now on.
    pub fn destroy(&self) {
        self.state.lock().destroyed = true;
    }

    /// Records of every released painter, oldest first.
    pub fn paints(&self) -> Vec<PaintRecord> {
        self.paints.lock().clone()
    }

    pub fn paint_count(&self) -> usize {
        self.paints.lock().len()
    }

    pub fn last_paint(&self) -> Option<PaintRecord> {
        self.paints.lock().last().cloned()
    }
}

/// Lays out text in fixed cells: every character is half the font size wide and lines are one
/// font size tall. Lines wrap at any character when a finite max width is set.
#[derive(Debug, Clone)]
pub struct MonospaceTextLayout {
    text: String,
    font: Font,
    max_width: f64,
    max_height: f64,
}

/// A line as a range of character indices.
#[derive(Debug, Clone, Copy)]
struct Line {
    start: usize,
    len: usize,
}

impl MonospaceTextLayout {
    pub fn new(font: Font, text: &str) -> MonospaceTextLayout {
        MonospaceTextLayout {
            text: text.to_string(),
            font,
            max_width: INFINITE_LENGTH,
            max_height: INFINITE_LENGTH,
        }
    }

    pub fn char_width(&self) -> f64 {
        self.font.size / 2.
    }

    pub fn line_height(&self) -> f64 {
        self.font.size
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    fn chars_per_line(&self) -> Option<usize> {
        if is_infinite_length(self.max_width) || self.char_width() <= 0. {
            return None;
        }
        Some(((self.max_width / self.char_width()).floor() as usize).max(1))
    }

    fn lines(&self) -> Vec<Line> {
        let count = self.char_count();
        let per_line = match self.chars_per_line() {
            Some(per_line) => per_line,
            None => return vec![Line { start: 0, len: count }],
        };
        if count == 0 {
            return vec![Line { start: 0, len: 0 }];
        }
        (0..count)
            .step_by(per_line)
            .map(|start| Line {
                start,
                len: per_line.min(count - start),
            })
            .collect()
    }

    /// Line index and column of a character position, clamped to the text.
    fn locate(&self, position: usize) -> (usize, usize) {
        let lines = self.lines();
        let position = position.min(self.char_count());
        for (index, line) in lines.iter().enumerate() {
            if position < line.start + line.len {
                return (index, position - line.start);
            }
        }
        let last = lines.len() - 1;
        (last, lines[last].len)
    }
}

impl TextLayout for MonospaceTextLayout {
    fn text(&self) -> &str {
        &self.text
    }

    fn set_text(&mut self, text: String) {
        self.text = text;
    }

    fn font(&self) -> &Font {
        &self.font
    }

    fn set_font(&mut self, font: Font) {
        self.font = font;
    }

    fn set_max_width(&mut self, width: f64) {
        self.max_width = width;
    }

    fn set_max_height(&mut self, height: f64) {
        self.max_height = height;
    }

    fn text_bounds(&self) -> Rect {
        let lines = self.lines();
        let widest = lines.iter().map(|line| line.len).max().unwrap_or(0);
        Rect::from_ltwh(
            0.,
            0.,
            widest as f64 * self.char_width(),
            lines.len() as f64 * self.line_height(),
        )
    }

    fn text_range_rects(&self, range: TextRange) -> Vec<Rect> {
        if range.is_empty() {
            return Vec::new();
        }
        let (cw, lh) = (self.char_width(), self.line_height());
        self.lines()
            .iter()
            .enumerate()
            .filter_map(|(index, line)| {
                let start = range.position.max(line.start);
                let end = range.end().min(line.start + line.len);
                if start >= end {
                    return None;
                }
                Some(Rect::from_ltwh(
                    (start - line.start) as f64 * cw,
                    index as f64 * lh,
                    (end - start) as f64 * cw,
                    lh,
                ))
            })
            .collect()
    }

    fn caret_point(&self, position: usize, trailing: bool) -> Point {
        let (line, column) = self.locate(position);
        let column = if trailing { column + 1 } else { column };
        Point::new(
            column as f64 * self.char_width(),
            line as f64 * self.line_height(),
        )
    }

    fn hit_test(&self, point: Point) -> TextHitTestResult {
        let lines = self.lines();
        let (cw, lh) = (self.char_width(), self.line_height());
        let inside_text = self.text_bounds().contains(point);

        let row = (point.y / lh).floor().max(0.) as usize;
        let line = lines[row.min(lines.len() - 1)];
        if line.len == 0 {
            return TextHitTestResult {
                position: line.start,
                trailing: false,
                inside_text,
            };
        }

        let x = (point.x / cw).max(0.);
        let column = (x.floor() as usize).min(line.len - 1);
        let trailing = x - column as f64 >= 0.5;
        TextHitTestResult {
            position: line.start + column,
            trailing,
            inside_text,
        }
    }
}

/// Creates [`MonospaceTextLayout`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessGraphicsFactory;

impl HeadlessGraphicsFactory {
    pub fn new() -> HeadlessGraphicsFactory {
        HeadlessGraphicsFactory
    }
}

impl GraphicsFactory for HeadlessGraphicsFactory {
    fn create_text_layout(&self, font: Font, text: &str) -> Box<dyn TextLayout> {
        Box::new(MonospaceTextLayout::new(font, text))
    }
}
