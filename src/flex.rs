//! Flex layout: children in a row or column, growing or shrinking to fill the main axis.

use crate::rect::{Point, Rect};
use crate::render_object::{ChildMode, RenderKind, RenderObject};
use crate::size::{is_infinite_length, Size, INFINITE_LENGTH};
use crate::stack::{anchor, Alignment};

/// Main axis and the direction children are placed along it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlexDirection {
    Horizontal,
    HorizontalReverse,
    Vertical,
    VerticalReverse,
}

impl FlexDirection {
    pub fn is_horizontal(self) -> bool {
        match self {
            FlexDirection::Horizontal | FlexDirection::HorizontalReverse => true,
            FlexDirection::Vertical | FlexDirection::VerticalReverse => false,
        }
    }

    pub fn is_reverse(self) -> bool {
        match self {
            FlexDirection::HorizontalReverse | FlexDirection::VerticalReverse => true,
            FlexDirection::Horizontal | FlexDirection::Vertical => false,
        }
    }
}

/// How leftover main-axis space is distributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlexMainAlignment {
    Start,
    Center,
    End,
    /// Equal gaps between children, none at the ends.
    SpaceBetween,
    /// Equal space around every child; the ends get half a gap.
    SpaceAround,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlexCrossAlignment {
    Start,
    Center,
    End,
}

impl FlexCrossAlignment {
    fn as_alignment(self) -> Alignment {
        match self {
            FlexCrossAlignment::Start => Alignment::Start,
            FlexCrossAlignment::Center => Alignment::Center,
            FlexCrossAlignment::End => Alignment::End,
        }
    }
}

/// Per-child flex parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlexChildLayoutData {
    /// Fixed main length before growing or shrinking. Measured size when unset.
    pub basis: Option<f64>,
    /// Share of leftover space. Zero never grows.
    pub grow: f64,
    /// Share of overflow to give back. Zero never shrinks.
    pub shrink: f64,
    /// Overrides the layout's cross alignment.
    pub cross_alignment: Option<FlexCrossAlignment>,
}

impl Default for FlexChildLayoutData {
    fn default() -> Self {
        FlexChildLayoutData {
            basis: None,
            grow: 0.,
            shrink: 0.,
            cross_alignment: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FlexLayout {
    direction: FlexDirection,
    main_alignment: FlexMainAlignment,
    cross_alignment: FlexCrossAlignment,
    child_data: Vec<FlexChildLayoutData>,
    /// Child sizes decided by the last measure, in child order.
    resolved: Vec<Size>,
}

impl Default for FlexLayout {
    fn default() -> Self {
        FlexLayout::new(FlexDirection::Horizontal)
    }
}

impl FlexLayout {
    pub fn new(direction: FlexDirection) -> FlexLayout {
        FlexLayout {
            direction,
            main_alignment: FlexMainAlignment::Start,
            cross_alignment: FlexCrossAlignment::Center,
            child_data: Vec::new(),
            resolved: Vec::new(),
        }
    }

    pub fn with_main_alignment(mut self, alignment: FlexMainAlignment) -> Self {
        self.main_alignment = alignment;
        self
    }

    pub fn with_cross_alignment(mut self, alignment: FlexCrossAlignment) -> Self {
        self.cross_alignment = alignment;
        self
    }

    pub fn direction(&self) -> FlexDirection {
        self.direction
    }

    pub fn set_direction(&mut self, direction: FlexDirection) {
        self.direction = direction;
    }

    pub fn main_alignment(&self) -> FlexMainAlignment {
        self.main_alignment
    }

    pub fn set_main_alignment(&mut self, alignment: FlexMainAlignment) {
        self.main_alignment = alignment;
    }

    pub fn cross_alignment(&self) -> FlexCrossAlignment {
        self.cross_alignment
    }

    pub fn set_cross_alignment(&mut self, alignment: FlexCrossAlignment) {
        self.cross_alignment = alignment;
    }

    pub fn child_layout_data(&self, position: usize) -> Option<&FlexChildLayoutData> {
        self.child_data.get(position)
    }

    pub fn set_child_layout_data(&mut self, position: usize, data: FlexChildLayoutData) {
        if let Some(slot) = self.child_data.get_mut(position) {
            *slot = data;
        }
    }

    fn data(&self, position: usize) -> FlexChildLayoutData {
        self.child_data.get(position).copied().unwrap_or_default()
    }

    fn main_of(&self, size: Size) -> f64 {
        if self.direction.is_horizontal() {
            size.width
        } else {
            size.height
        }
    }

    fn cross_of(&self, size: Size) -> f64 {
        if self.direction.is_horizontal() {
            size.height
        } else {
            size.width
        }
    }

    fn size_of(&self, main: f64, cross: f64) -> Size {
        if self.direction.is_horizontal() {
            Size::new(main, cross)
        } else {
            Size::new(cross, main)
        }
    }

    fn point_of(&self, main: f64, cross: f64) -> Point {
        if self.direction.is_horizontal() {
            Point::new(main, cross)
        } else {
            Point::new(cross, main)
        }
    }

    /// Measures `child` against `main` and records the size it will be laid out with.
    fn measure_child(&mut self, child: &mut RenderObject, i: usize, main: f64, cross: f64) {
        child.measure(self.size_of(main, cross));
        let measured_cross = self.cross_of(child.preferred_size());
        self.resolved[i] = self.size_of(main, measured_cross);
    }

    /// Grows (`remaining > 0`) or shrinks (`remaining < 0`) children by their factors.
    fn distribute(&mut self, children: &mut [RenderObject], remaining: f64, cross: f64) {
        let growing = remaining > 0.;
        let factor = |data: &FlexChildLayoutData| if growing { data.grow } else { data.shrink };
        let total: f64 = (0..children.len())
            .map(|i| factor(&self.data(i)))
            .filter(|f| *f > 0.)
            .sum();
        if total <= 0. {
            return;
        }

        for (i, child) in children.iter_mut().enumerate() {
            let share = factor(&self.data(i));
            if share <= 0. {
                continue;
            }
            let main = (self.main_of(self.resolved[i]) + remaining * share / total).max(0.);
            self.measure_child(child, i, main, cross);
        }
    }
}

impl RenderKind for FlexLayout {
    fn name(&self) -> &str {
        "flex"
    }

    fn child_mode(&self) -> ChildMode {
        ChildMode::Multiple
    }

    fn measure_content(&mut self, children: &mut [RenderObject], available: Size) -> Size {
        let main_available = self.main_of(available);
        let cross_available = self.cross_of(available);
        let bounded = !is_infinite_length(main_available);
        self.resolved = vec![Size::zero(); children.len()];

        let mut used = 0.;
        for (i, child) in children.iter_mut().enumerate() {
            if let Some(basis) = self.data(i).basis {
                self.measure_child(child, i, basis, cross_available);
                used += basis;
            }
        }

        for (i, child) in children.iter_mut().enumerate() {
            if self.data(i).basis.is_some() {
                continue;
            }
            let remaining = if bounded {
                (main_available - used).max(0.)
            } else {
                INFINITE_LENGTH
            };
            child.measure(self.size_of(remaining, cross_available));
            self.resolved[i] = child.preferred_size();
            used += self.main_of(self.resolved[i]);
        }

        if bounded {
            let remaining = main_available - used;
            if remaining != 0. {
                self.distribute(children, remaining, cross_available);
            }
        }

        let total_main: f64 = self.resolved.iter().map(|size| self.main_of(*size)).sum();
        let max_cross = self
            .resolved
            .iter()
            .map(|size| self.cross_of(*size))
            .fold(0., f64::max);

        let main = if bounded {
            total_main.min(main_available)
        } else {
            total_main
        };
        let cross = if is_infinite_length(cross_available) {
            max_cross
        } else {
            max_cross.min(cross_available)
        };
        self.size_of(main, cross)
    }

    fn layout_content(&mut self, children: &mut [RenderObject], content_rect: Rect) {
        if self.resolved.len() != children.len() {
            self.resolved = children.iter().map(|child| child.preferred_size()).collect();
        }

        let (main_start, cross_start) = if self.direction.is_horizontal() {
            (content_rect.left(), content_rect.top())
        } else {
            (content_rect.top(), content_rect.left())
        };
        let main_total = self.main_of(content_rect.size);
        let cross_total = self.cross_of(content_rect.size);

        let count = children.len();
        let content_main: f64 = self.resolved.iter().map(|size| self.main_of(*size)).sum();
        let free = main_total - content_main;

        let (lead, gap) = match self.main_alignment {
            FlexMainAlignment::Start => (0., 0.),
            FlexMainAlignment::Center => (free / 2., 0.),
            FlexMainAlignment::End => (free, 0.),
            FlexMainAlignment::SpaceBetween if free > 0. && count > 1 => {
                (0., free / (count - 1) as f64)
            }
            FlexMainAlignment::SpaceAround if free > 0. && count > 0 => {
                let gap = free / count as f64;
                (gap / 2., gap)
            }
            FlexMainAlignment::SpaceBetween | FlexMainAlignment::SpaceAround => (0., 0.),
        };

        let mut cursor = lead;
        for (i, child) in children.iter_mut().enumerate() {
            let size = self.resolved[i];
            let main_length = self.main_of(size);
            let cross_length = self.cross_of(size);

            let main = if self.direction.is_reverse() {
                main_start + main_total - cursor - main_length
            } else {
                main_start + cursor
            };
            let alignment = self
                .data(i)
                .cross_alignment
                .unwrap_or(self.cross_alignment)
                .as_alignment();
            let cross = anchor(alignment, cross_start, cross_total, cross_length);

            child.layout(Rect::new(self.point_of(main, cross), size));
            cursor += main_length + gap;
        }
    }

    fn on_add_child(&mut self, position: usize) {
        self.child_data
            .insert(position, FlexChildLayoutData::default());
        self.resolved.clear();
    }

    fn on_remove_child(&mut self, position: usize) {
        self.child_data.remove(position);
        self.resolved.clear();
    }
}
