//! Stack layout: children on top of each other, each aligned in the content rect.

use crate::rect::{Point, Rect};
use crate::render_object::{ChildMode, RenderKind, RenderObject};
use crate::size::Size;

/// Placement of a child along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Start,
    Center,
    End,
    /// Take the whole length.
    Stretch,
}

impl Default for Alignment {
    fn default() -> Self {
        Alignment::Start
    }
}

/// Returns where a child of `length` starts inside `[start, start + total)`.
pub fn anchor(alignment: Alignment, start: f64, total: f64, length: f64) -> f64 {
    let factor = match alignment {
        Alignment::Start | Alignment::Stretch => 0.,
        Alignment::Center => 0.5,
        Alignment::End => 1.,
    };
    start + (total - length) * factor
}

/// Per-child overrides of the stack's default alignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StackChildLayoutData {
    pub horizontal: Option<Alignment>,
    pub vertical: Option<Alignment>,
}

/// Lays every child over the others.
///
/// The content is as large as the largest child in each dimension.
#[derive(Debug, Clone, Default)]
pub struct StackLayout {
    horizontal: Alignment,
    vertical: Alignment,
    child_data: Vec<StackChildLayoutData>,
}

impl StackLayout {
    pub fn new() -> StackLayout {
        StackLayout::default()
    }

    pub fn with_alignment(mut self, horizontal: Alignment, vertical: Alignment) -> Self {
        self.horizontal = horizontal;
        self.vertical = vertical;
        self
    }

    pub fn default_alignment(&self) -> (Alignment, Alignment) {
        (self.horizontal, self.vertical)
    }

    pub fn set_default_alignment(&mut self, horizontal: Alignment, vertical: Alignment) {
        self.horizontal = horizontal;
        self.vertical = vertical;
    }

    pub fn child_layout_data(&self, position: usize) -> Option<&StackChildLayoutData> {
        self.child_data.get(position)
    }

    pub fn set_child_layout_data(&mut self, position: usize, data: StackChildLayoutData) {
        if let Some(slot) = self.child_data.get_mut(position) {
            *slot = data;
        }
    }

    fn alignment_of(&self, position: usize) -> (Alignment, Alignment) {
        let data = self.child_data.get(position).copied().unwrap_or_default();
        (
            data.horizontal.unwrap_or(self.horizontal),
            data.vertical.unwrap_or(self.vertical),
        )
    }
}

impl RenderKind for StackLayout {
    fn name(&self) -> &str {
        "stack"
    }

    fn child_mode(&self) -> ChildMode {
        ChildMode::Multiple
    }

    fn measure_content(&mut self, children: &mut [RenderObject], available: Size) -> Size {
        let mut max = Size::zero();
        for child in children.iter_mut() {
            child.measure(available);
            max = max.max(child.preferred_size());
        }
        max
    }

    fn layout_content(&mut self, children: &mut [RenderObject], content_rect: Rect) {
        for (i, child) in children.iter_mut().enumerate() {
            let (horizontal, vertical) = self.alignment_of(i);
            let preferred = child.preferred_size();
            let width = if horizontal == Alignment::Stretch {
                content_rect.width()
            } else {
                preferred.width
            };
            let height = if vertical == Alignment::Stretch {
                content_rect.height()
            } else {
                preferred.height
            };

            let origin = Point::new(
                anchor(horizontal, content_rect.left(), content_rect.width(), width),
                anchor(vertical, content_rect.top(), content_rect.height(), height),
            );
            child.layout(Rect::new(origin, Size::new(width, height)));
        }
    }

    fn on_add_child(&mut self, position: usize) {
        self.child_data
            .insert(position, StackChildLayoutData::default());
    }

    fn on_remove_child(&mut self, position: usize) {
        self.child_data.remove(position);
    }
}
