//! The render tree.
//!
//! A [`RenderObject`] is a node in the retained visual tree. Every node follows the same box
//! model: its rect is made of the margin, an optional border band owned by the node's kind, the
//! padding and finally the content rect that children are placed into.
//!
//! Layout happens in two passes. [`RenderObject::measure`] walks the tree bottom-up and caches
//! each node's preferred size for some available size (which may be unconstrained in either
//! dimension). [`RenderObject::layout`] then walks top-down and assigns every node its final rect
//! in its parent's local coordinate space.
//!
//! What a node does with its children is decided by its [`RenderKind`].

use crate::cycler::Invalidator;
use crate::error::TreeError;
use crate::graphics::{Painter, TransformGuard};
use crate::rect::{translation, Point, Rect, Vector};
use crate::size::{is_infinite_length, Size, Thickness};
use cgmath::{EuclideanSpace, Vector2, Zero};
use core::any::Any;
use core::fmt;
use log::{debug, warn};
use uuid::Uuid;

/// Identifies a render object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderObjectId(Uuid);

impl RenderObjectId {
    fn new() -> RenderObjectId {
        RenderObjectId(Uuid::new_v4())
    }
}

/// Identifies the control (widget) a render object belongs to.
///
/// Controls themselves live outside this crate; the render tree only carries their IDs so the
/// host can route events to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlId(Uuid);

impl ControlId {
    pub fn new() -> ControlId {
        ControlId(Uuid::new_v4())
    }
}

impl Default for ControlId {
    fn default() -> Self {
        ControlId::new()
    }
}

/// How many children a render object may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildMode {
    None,
    Single,
    Multiple,
}

impl ChildMode {
    /// Returns true if a node with this mode and `len` children can take another one.
    pub fn accepts(self, len: usize) -> bool {
        match self {
            ChildMode::None => false,
            ChildMode::Single => len == 0,
            ChildMode::Multiple => true,
        }
    }
}

/// Box-model geometry of a render object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Position of the node's top left corner in its parent's local coordinate space.
    pub offset: Vector,
    /// Size assigned by the last layout.
    pub size: Size,
    pub margin: Thickness,
    pub padding: Thickness,
    /// Size computed by the last measure.
    pub preferred_size: Size,
    /// Lower bound on the measured size.
    pub min_size: Size,
    /// Upper bound on the measured size. Unconstrained components impose no bound.
    pub max_size: Size,
    /// A size the node asks for regardless of its content. Unconstrained components are
    /// unspecified.
    pub suggested_size: Size,
}

/// Shrinks `rect` by `band` the way every node derives its inner rects: the origin never moves
/// past the far edge of `size` and the result never has a negative size.
fn inset(size: Size, band: Thickness) -> Rect {
    let rect = Rect::new(Point::origin(), size).shrink(band);
    Rect::from_ltwh(
        rect.left().min(size.width),
        rect.top().min(size.height),
        rect.width().max(0.),
        rect.height().max(0.),
    )
}

impl Frame {
    pub fn new() -> Frame {
        Frame {
            offset: Vector2::zero(),
            size: Size::zero(),
            margin: Thickness::zero(),
            padding: Thickness::zero(),
            preferred_size: Size::zero(),
            min_size: Size::zero(),
            max_size: Size::infinite(),
            suggested_size: Size::infinite(),
        }
    }

    /// Narrows an available size by the node's own constraints. A suggested length replaces
    /// the available one, within the bounds.
    pub fn constrain_available(&self, available: Size) -> Size {
        let limit = available.min(self.max_size);
        let pick = |limit: f64, min: f64, suggested: f64| {
            if is_infinite_length(suggested) {
                limit
            } else {
                suggested.max(min).min(limit)
            }
        };
        Size::new(
            pick(limit.width, self.min_size.width, self.suggested_size.width),
            pick(limit.height, self.min_size.height, self.suggested_size.height),
        )
    }

    /// Expands a measured size to the suggested and minimum sizes, then clamps it into the
    /// constrained `available` size. The upper bound wins over the lower one.
    pub fn constrain_measured(&self, measured: Size, available: Size) -> Size {
        let suggested = |length: f64| if is_infinite_length(length) { 0. } else { length };
        let floor = Size::new(
            suggested(self.suggested_size.width),
            suggested(self.suggested_size.height),
        )
        .max(self.min_size);
        measured.max(floor).min(available)
    }

    /// The node's rect in its own local coordinate space.
    pub fn local_rect(&self) -> Rect {
        Rect::new(Point::origin(), self.size)
    }

    /// The local rect without the margin.
    pub fn padding_rect(&self) -> Rect {
        inset(self.size, self.margin)
    }

    /// The local rect without margin, `border` and padding.
    pub fn content_rect(&self, border: Thickness) -> Rect {
        inset(self.size, self.margin + border + self.padding)
    }
}

impl Default for Frame {
    fn default() -> Self {
        Frame::new()
    }
}

/// Upcasting to [`Any`], implemented for every `'static` type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Result of a kind's hit test.
#[derive(Debug)]
pub enum Hit<'a> {
    /// A descendant was hit.
    Node(&'a RenderObject),
    /// The node itself was hit.
    This,
    Miss,
}

/// Per-kind behavior of a render object.
///
/// Implementations only deal with their content: the surrounding margin, border and padding are
/// handled by [`RenderObject`]. Children passed to the kind are laid out in the node's local
/// coordinate space.
pub trait RenderKind: AsAny + fmt::Debug + Send {
    /// A short name used in logs and debug paths.
    fn name(&self) -> &str;

    fn child_mode(&self) -> ChildMode;

    /// Border band between the margin and the padding. Most kinds have none.
    fn border_thickness(&self) -> Thickness {
        Thickness::zero()
    }

    /// Measures children against the available content size and returns the desired content size.
    ///
    /// Components of `available` may be unconstrained (see [`Size::infinite`]). Implementations
    /// must size to content in those dimensions and never do arithmetic with the sentinel.
    fn measure_content(&mut self, children: &mut [RenderObject], available: Size) -> Size;

    /// Lays out children inside `content_rect`, which is in the node's local coordinate space.
    fn layout_content(&mut self, children: &mut [RenderObject], content_rect: Rect);

    fn draw(&self, frame: &Frame, children: &[RenderObject], painter: &mut dyn Painter) {
        let _ = frame;
        draw_children(children, painter);
    }

    /// Hit-tests a point in the node's local coordinate space.
    fn hit_test<'a>(&self, frame: &Frame, children: &'a [RenderObject], point: Point) -> Hit<'a> {
        default_hit_test(frame, children, point)
    }

    /// Called after a child was inserted at `position`.
    fn on_add_child(&mut self, position: usize) {
        let _ = position;
    }

    /// Called after the child at `position` was removed.
    fn on_remove_child(&mut self, position: usize) {
        let _ = position;
    }

    /// Called on the child when it is added to or removed from a parent.
    fn on_parent_changed(&mut self, old: Option<RenderObjectId>, new: Option<RenderObjectId>) {
        let _ = (old, new);
    }

    /// Called during layout when the node's size changed.
    fn on_resize(&mut self, frame: &Frame) {
        let _ = frame;
    }

    /// Called on every layout with the final frame, before children are laid out.
    fn on_layout(&mut self, frame: &Frame) {
        let _ = frame;
    }
}

/// Draws a child translated into its own local coordinate space.
///
/// The painter's transform is restored afterwards, even if the child panics.
pub fn draw_child(child: &RenderObject, painter: &mut dyn Painter) {
    let mut painter = TransformGuard::new(painter, translation(child.offset()));
    child.draw(&mut *painter);
}

/// Draws all children in order.
pub fn draw_children(children: &[RenderObject], painter: &mut dyn Painter) {
    for child in children {
        draw_child(child, painter);
    }
}

/// Hit-tests children from the topmost (last) one down.
pub fn hit_test_children(children: &[RenderObject], point: Point) -> Option<&RenderObject> {
    children
        .iter()
        .rev()
        .find_map(|child| child.hit_test(point - child.offset()))
}

/// Children first, then the node's padding rect.
pub fn default_hit_test<'a>(frame: &Frame, children: &'a [RenderObject], point: Point) -> Hit<'a> {
    if let Some(node) = hit_test_children(children, point) {
        Hit::Node(node)
    } else if frame.padding_rect().contains(point) {
        Hit::This
    } else {
        Hit::Miss
    }
}

/// A node in the render tree.
#[derive(Debug)]
pub struct RenderObject {
    id: RenderObjectId,
    parent: Option<RenderObjectId>,
    control: Option<ControlId>,
    host: Option<Invalidator>,
    frame: Frame,
    children: Vec<RenderObject>,
    kind: Box<dyn RenderKind>,
    layout_valid: bool,
    last_available: Option<Size>,
}

impl RenderObject {
    pub fn new<K: RenderKind>(kind: K) -> RenderObject {
        RenderObject {
            id: RenderObjectId::new(),
            parent: None,
            control: None,
            host: None,
            frame: Frame::new(),
            children: Vec::new(),
            kind: Box::new(kind),
            layout_valid: false,
            last_available: None,
        }
    }

    pub fn with_margin(mut self, margin: Thickness) -> Self {
        self.frame.margin = margin;
        self
    }

    pub fn with_padding(mut self, padding: Thickness) -> Self {
        self.frame.padding = padding;
        self
    }

    pub fn with_min_size(mut self, size: Size) -> Self {
        self.frame.min_size = size;
        self
    }

    pub fn with_max_size(mut self, size: Size) -> Self {
        self.frame.max_size = size;
        self
    }

    pub fn with_suggested_size(mut self, size: Size) -> Self {
        self.frame.suggested_size = size;
        self
    }

    pub fn with_control(mut self, control: ControlId) -> Self {
        self.control = Some(control);
        self
    }

    /// Adds a child at the end. See [`RenderObject::add_child`].
    pub fn with_child(mut self, child: RenderObject) -> Result<Self, TreeError> {
        let len = self.children.len();
        self.add_child(child, len)?;
        Ok(self)
    }

    pub fn id(&self) -> RenderObjectId {
        self.id
    }

    /// The parent's ID. Only meaningful as a reference; parents are found through the root.
    pub fn parent(&self) -> Option<RenderObjectId> {
        self.parent
    }

    pub fn name(&self) -> &str {
        self.kind.name()
    }

    pub fn child_mode(&self) -> ChildMode {
        self.kind.child_mode()
    }

    pub fn attached_control(&self) -> Option<ControlId> {
        self.control
    }

    pub fn set_attached_control(&mut self, control: Option<ControlId>) {
        self.control = control;
        self.mark_layout_dirty();
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn offset(&self) -> Vector {
        self.frame.offset
    }

    pub fn size(&self) -> Size {
        self.frame.size
    }

    pub fn preferred_size(&self) -> Size {
        self.frame.preferred_size
    }

    pub fn margin(&self) -> Thickness {
        self.frame.margin
    }

    pub fn set_margin(&mut self, margin: Thickness) {
        self.frame.margin = margin;
        self.mark_layout_dirty();
    }

    pub fn padding(&self) -> Thickness {
        self.frame.padding
    }

    pub fn set_padding(&mut self, padding: Thickness) {
        self.frame.padding = padding;
        self.mark_layout_dirty();
    }

    pub fn min_size(&self) -> Size {
        self.frame.min_size
    }

    pub fn set_min_size(&mut self, size: Size) {
        self.frame.min_size = size;
        self.mark_layout_dirty();
    }

    pub fn max_size(&self) -> Size {
        self.frame.max_size
    }

    pub fn set_max_size(&mut self, size: Size) {
        self.frame.max_size = size;
        self.mark_layout_dirty();
    }

    pub fn suggested_size(&self) -> Size {
        self.frame.suggested_size
    }

    pub fn set_suggested_size(&mut self, size: Size) {
        self.frame.suggested_size = size;
        self.mark_layout_dirty();
    }

    pub fn border_thickness(&self) -> Thickness {
        self.kind.border_thickness()
    }

    /// The local rect without the margin.
    pub fn padding_rect(&self) -> Rect {
        self.frame.padding_rect()
    }

    /// The area children are laid out in, in local coordinates.
    pub fn content_rect(&self) -> Rect {
        self.frame.content_rect(self.kind.border_thickness())
    }

    pub fn children(&self) -> &[RenderObject] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn child(&self, position: usize) -> Option<&RenderObject> {
        self.children.get(position)
    }

    /// The child may be changed through the returned reference, so this node's cached
    /// measurement is dropped.
    pub fn child_mut(&mut self, position: usize) -> Option<&mut RenderObject> {
        self.layout_valid = false;
        self.children.get_mut(position)
    }

    /// Returns the kind if it is a `K`.
    pub fn kind<K: RenderKind>(&self) -> Option<&K> {
        (*self.kind).as_any().downcast_ref::<K>()
    }

    /// Returns the kind if it is a `K`, without invalidating anything.
    pub fn kind_mut<K: RenderKind>(&mut self) -> Option<&mut K> {
        self.layout_valid = false;
        (*self.kind).as_any_mut().downcast_mut::<K>()
    }

    /// Mutates the kind if it is a `K` and invalidates layout and paint.
    pub fn update_kind<K: RenderKind, R>(&mut self, f: impl FnOnce(&mut K) -> R) -> Option<R> {
        let result = self.kind_mut::<K>().map(f);
        if result.is_some() {
            self.mark_layout_dirty();
        }
        result
    }

    /// Requests a relayout (and repaint) from the host, if attached.
    ///
    /// Changes made through `&mut self` also drop the node's cached measurement. Nodes are
    /// reached through their ancestors' `child_mut`/`find_mut`, which drop theirs.
    pub fn invalidate_layout(&self) {
        if let Some(host) = &self.host {
            host.invalidate_layout();
        }
    }

    fn mark_layout_dirty(&mut self) {
        self.layout_valid = false;
        self.invalidate_layout();
    }

    /// Requests a repaint from the host, if attached.
    pub fn invalidate_paint(&self) {
        if let Some(host) = &self.host {
            host.invalidate_paint();
        }
    }

    pub fn is_attached(&self) -> bool {
        self.host.is_some()
    }

    pub(crate) fn set_host_recursive(&mut self, host: Option<Invalidator>) {
        for child in &mut self.children {
            child.set_host_recursive(host.clone());
        }
        self.host = host;
    }

    /// Inserts a child at `position` (which may equal the child count).
    pub fn add_child(
        &mut self,
        mut child: RenderObject,
        position: usize,
    ) -> Result<RenderObjectId, TreeError> {
        let len = self.children.len();
        if position > len {
            return Err(TreeError::ChildPositionOutOfRange { position, len });
        }
        let mode = self.kind.child_mode();
        if !mode.accepts(len) {
            return Err(TreeError::ChildModeViolation {
                name: self.kind.name().to_string(),
                mode,
            });
        }

        let old_parent = child.parent.replace(self.id);
        child.set_host_recursive(self.host.clone());
        child.kind.on_parent_changed(old_parent, Some(self.id));

        let id = child.id;
        self.children.insert(position, child);
        self.kind.on_add_child(position);

        self.mark_layout_dirty();
        self.invalidate_paint();
        Ok(id)
    }

    /// Removes and returns the child at `position`.
    pub fn remove_child(&mut self, position: usize) -> Result<RenderObject, TreeError> {
        let len = self.children.len();
        if position >= len {
            return Err(TreeError::ChildPositionOutOfRange { position, len });
        }

        let mut child = self.children.remove(position);
        child.parent = None;
        child.set_host_recursive(None);
        child.kind.on_parent_changed(Some(self.id), None);
        self.kind.on_remove_child(position);

        self.mark_layout_dirty();
        self.invalidate_paint();
        Ok(child)
    }

    /// Removes all children, last first.
    pub fn clear_children(&mut self) -> Vec<RenderObject> {
        let mut removed = Vec::with_capacity(self.children.len());
        while let Some(position) = self.children.len().checked_sub(1) {
            match self.remove_child(position) {
                Ok(child) => removed.push(child),
                Err(_) => break,
            }
        }
        removed.reverse();
        removed
    }

    /// Computes and caches the preferred size for the given available size.
    ///
    /// Skipped if the node was laid out since it last measured against the same size and
    /// nothing changed in between.
    pub fn measure(&mut self, available: Size) {
        debug!("{}: measure begins, available {:?}", self.name(), available);
        if self.layout_valid && self.last_available == Some(available) {
            debug!("{}: measure skipped", self.name());
            return;
        }
        self.last_available = Some(available);
        let available = self.frame.constrain_available(available);

        let band = self.frame.margin + self.kind.border_thickness() + self.frame.padding;
        let band_size = band.total_size();
        let coerced_band = band_size.coerce_into(available);
        if coerced_band.width < band_size.width {
            warn!(
                "{}: horizontal margin, border and padding exceed the available width",
                self.name()
            );
        }
        if coerced_band.height < band_size.height {
            warn!(
                "{}: vertical margin, border and padding exceed the available height",
                self.name()
            );
        }

        let content_available = available.shrink(band);
        let content = self.kind.measure_content(&mut self.children, content_available);
        debug_assert!(
            content.width >= 0. && content.height >= 0.,
            "negative content size from {}",
            self.name()
        );

        self.frame.preferred_size = self
            .frame
            .constrain_measured(coerced_band + content, available);
        debug!(
            "{}: measure ends, preferred {:?}",
            self.name(),
            self.frame.preferred_size
        );
    }

    /// Assigns the final rect, given in the parent's local coordinate space, and lays out children.
    pub fn layout(&mut self, rect: Rect) {
        debug!("{}: layout {:?}", self.name(), rect);

        self.frame.offset = rect.origin.to_vec();
        if self.frame.size != rect.size {
            self.frame.size = rect.size;
            self.kind.on_resize(&self.frame);
        }
        self.kind.on_layout(&self.frame);

        let content_rect = self.content_rect();
        self.kind.layout_content(&mut self.children, content_rect);
        self.layout_valid = true;
    }

    /// Lays out at `origin` with the preferred size.
    pub fn layout_at(&mut self, origin: Point) {
        let size = self.frame.preferred_size;
        self.layout(Rect::new(origin, size));
    }

    /// Draws this node in its local coordinate space.
    pub fn draw(&self, painter: &mut dyn Painter) {
        self.kind.draw(&self.frame, &self.children, painter);
    }

    /// Returns the deepest node under `point`, which is in this node's local coordinate space.
    pub fn hit_test(&self, point: Point) -> Option<&RenderObject> {
        match self.kind.hit_test(&self.frame, &self.children, point) {
            Hit::Node(node) => Some(node),
            Hit::This => Some(self),
            Hit::Miss => None,
        }
    }

    pub fn find(&self, id: RenderObjectId) -> Option<&RenderObject> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Like [`RenderObject::find`]. Every ancestor of the found node drops its cached
    /// measurement.
    pub fn find_mut(&mut self, id: RenderObjectId) -> Option<&mut RenderObject> {
        if self.id == id {
            return Some(self);
        }
        let found = self.children.iter_mut().find_map(|child| child.find_mut(id));
        if found.is_some() {
            self.layout_valid = false;
        }
        found
    }

    /// Finds the first node, in pre-order, attached to `control`.
    pub fn find_control(&self, control: ControlId) -> Option<&RenderObject> {
        if self.control == Some(control) {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|child| child.find_control(control))
    }

    /// The chain of nodes from this node down to `id`, both included.
    pub fn ancestry(&self, id: RenderObjectId) -> Option<Vec<&RenderObject>> {
        if self.id == id {
            return Some(vec![self]);
        }
        self.children
            .iter()
            .find_map(|child| child.ancestry(id))
            .map(|mut chain| {
                chain.insert(0, self);
                chain
            })
    }

    /// Child positions leading from this node to `id`.
    pub fn path_to(&self, id: RenderObjectId) -> Option<Vec<usize>> {
        if self.id == id {
            return Some(Vec::new());
        }
        self.children.iter().enumerate().find_map(|(i, child)| {
            child.path_to(id).map(|mut path| {
                path.insert(0, i);
                path
            })
        })
    }

    /// Offset of `id` in this node's coordinate space, including this node's own offset.
    pub fn total_offset(&self, id: RenderObjectId) -> Option<Vector> {
        let chain = self.ancestry(id)?;
        Some(
            chain
                .iter()
                .fold(Vector2::zero(), |sum, node| sum + node.offset()),
        )
    }

    /// Maps a point in this (root) node's parent space into the content space of `id`.
    pub fn from_root_to_content(&self, id: RenderObjectId, point: Point) -> Option<Point> {
        let offset = self.total_offset(id)?;
        let content = self.find(id)?.content_rect();
        Some(point - offset - content.origin.to_vec())
    }

    /// Controls attached along the path from `id` up to this node, nearest first.
    ///
    /// Nodes sharing a control with their parent appear once.
    pub fn control_ancestry(&self, id: RenderObjectId) -> Vec<ControlId> {
        let mut controls: Vec<ControlId> = Vec::new();
        if let Some(chain) = self.ancestry(id) {
            for node in chain.iter().rev() {
                if let Some(control) = node.control {
                    if controls.last() != Some(&control) {
                        controls.push(control);
                    }
                }
            }
        }
        controls
    }

    /// Node names from this node down to `id`, e.g. `window -> border -> text`.
    pub fn debug_path(&self, id: RenderObjectId) -> Option<String> {
        let chain = self.ancestry(id)?;
        let names: Vec<&str> = chain.iter().map(|node| node.name()).collect();
        Some(names.join(" -> "))
    }

    /// Calls `f` on this node and every descendant in pre-order.
    pub fn visit(&self, f: &mut dyn FnMut(&RenderObject)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::CanvasRenderObject;
    use crate::headless::{DrawCommand, RecordingPainter};
    use crate::size::INFINITE_LENGTH;
    use crate::stack::StackLayout;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn leaf(width: f64, height: f64) -> RenderObject {
        RenderObject::new(CanvasRenderObject::new(Size::new(width, height)))
    }

    fn measure_and_layout(node: &mut RenderObject, rect: Rect) {
        node.measure(rect.size);
        node.layout(rect);
    }

    #[test]
    fn box_model_adds_margin_to_content() {
        let mut node = leaf(40., 30.).with_margin(Thickness::new(1., 2., 3., 4.));
        node.measure(Size::infinite());
        assert_eq!(node.preferred_size(), Size::new(44., 36.));

        node.layout_at(Point::new(0., 0.));
        let content = node.content_rect();
        assert_eq!(content, Rect::from_ltwh(1., 2., 40., 30.));
        assert_eq!(
            node.size().width,
            content.width() + node.margin().horizontal_total()
        );
        assert_eq!(
            node.size().height,
            content.height() + node.margin().vertical_total()
        );
    }

    #[test]
    fn band_larger_than_available_is_clamped() {
        let mut node = leaf(10., 10.).with_padding(Thickness::uniform(20.));
        node.measure(Size::new(30., 100.));
        assert_eq!(node.preferred_size(), Size::new(30., 50.));

        node.layout(Rect::from_ltwh(0., 0., 30., 50.));
        let content = node.content_rect();
        assert_eq!(content.width(), 0.);
        assert!(content.left() <= 30.);
    }

    #[test]
    fn layout_is_idempotent() {
        let mut root = RenderObject::new(StackLayout::new())
            .with_padding(Thickness::uniform(3.))
            .with_child(leaf(20., 10.).with_margin(Thickness::uniform(2.)))
            .unwrap()
            .with_child(
                RenderObject::new(StackLayout::new())
                    .with_child(leaf(5., 5.))
                    .unwrap(),
            )
            .unwrap();

        let rect = Rect::from_ltwh(10., 10., 100., 80.);
        measure_and_layout(&mut root, rect);
        let mut first = Vec::new();
        root.visit(&mut |node| first.push(*node.frame()));

        root.layout(rect);
        let mut second = Vec::new();
        root.visit(&mut |node| second.push(*node.frame()));

        assert_eq!(first, second);
    }

    #[test]
    fn hit_test_prefers_last_added_sibling() {
        let mut root = RenderObject::new(StackLayout::new());
        let below = root.add_child(leaf(50., 50.), 0).unwrap();
        let above = root.add_child(leaf(50., 50.), 1).unwrap();
        measure_and_layout(&mut root, Rect::from_ltwh(0., 0., 50., 50.));

        let hit = root.hit_test(Point::new(25., 25.)).map(|node| node.id());
        assert_eq!(hit, Some(above));
        assert_ne!(hit, Some(below));
    }

    #[test]
    fn hit_test_translates_into_child_frame() {
        let mut root = RenderObject::new(StackLayout::new())
            .with_padding(Thickness::new(10., 20., 0., 0.))
            .with_child(leaf(30., 30.))
            .unwrap();
        measure_and_layout(&mut root, Rect::from_ltwh(0., 0., 100., 100.));

        let child = &root.children()[0];
        assert_eq!(child.offset(), Vector2::new(10., 20.));

        for &(x, y) in &[(15., 25.), (39., 49.), (5., 5.), (45., 25.)] {
            let point = Point::new(x, y);
            let from_parent = root.hit_test(point).map(|node| node.id());
            let from_child = child.hit_test(point - child.offset()).map(|node| node.id());
            if from_child.is_some() {
                assert_eq!(from_parent, from_child);
            } else {
                assert_eq!(from_parent, Some(root.id()));
            }
        }
    }

    #[test]
    fn hit_test_misses_margin() {
        let mut node = leaf(10., 10.).with_margin(Thickness::uniform(5.));
        measure_and_layout(&mut node, Rect::from_ltwh(0., 0., 20., 20.));
        assert!(node.hit_test(Point::new(2., 2.)).is_none());
        assert!(node.hit_test(Point::new(5., 5.)).is_some());
        assert!(node.hit_test(Point::new(15., 15.)).is_none());
    }

    #[test]
    fn add_child_rejects_bad_positions_and_modes() {
        let mut stack = RenderObject::new(StackLayout::new());
        assert_eq!(
            stack.add_child(leaf(1., 1.), 1).unwrap_err(),
            TreeError::ChildPositionOutOfRange {
                position: 1,
                len: 0
            }
        );
        assert!(stack.remove_child(0).is_err());

        let mut canvas = leaf(1., 1.);
        match canvas.add_child(leaf(1., 1.), 0) {
            Err(TreeError::ChildModeViolation { mode, .. }) => assert_eq!(mode, ChildMode::None),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn add_and_remove_update_parent_links() {
        let mut root = RenderObject::new(StackLayout::new());
        let a = root.add_child(leaf(1., 1.), 0).unwrap();
        let b = root.add_child(leaf(1., 1.), 0).unwrap();
        assert_eq!(root.children()[0].id(), b);
        assert_eq!(root.children()[1].parent(), Some(root.id()));

        let removed = root.remove_child(1).unwrap();
        assert_eq!(removed.id(), a);
        assert_eq!(removed.parent(), None);
        assert_eq!(root.child_count(), 1);
    }

    #[test]
    fn tree_queries() {
        let control = ControlId::new();
        let mut inner = RenderObject::new(StackLayout::new()).with_control(control);
        let target = inner.add_child(leaf(5., 5.), 0).unwrap();
        let mut root = RenderObject::new(StackLayout::new())
            .with_padding(Thickness::uniform(4.))
            .with_child(inner)
            .unwrap();
        measure_and_layout(&mut root, Rect::from_ltwh(0., 0., 50., 50.));

        assert_eq!(root.path_to(target), Some(vec![0, 0]));
        assert_eq!(root.total_offset(target), Some(Vector2::new(4., 4.)));
        assert_eq!(
            root.from_root_to_content(target, Point::new(10., 10.)),
            Some(Point::new(6., 6.))
        );
        assert_eq!(root.control_ancestry(target), vec![control]);
        assert_eq!(
            root.debug_path(target).as_ref().map(String::as_str),
            Some("stack -> stack -> canvas")
        );
        assert!(root.find_control(control).is_some());
    }

    #[test]
    fn draw_restores_transform_after_child_panics() {
        let mut canvas = CanvasRenderObject::new(Size::new(10., 10.));
        canvas.set_paint_handler(|_, _| panic!("paint failed"));
        let mut root = RenderObject::new(StackLayout::new())
            .with_padding(Thickness::uniform(7.))
            .with_child(RenderObject::new(canvas))
            .unwrap();
        measure_and_layout(&mut root, Rect::from_ltwh(0., 0., 40., 40.));

        let mut painter = RecordingPainter::new();
        let before = painter.transform();
        let result = catch_unwind(AssertUnwindSafe(|| root.draw(&mut painter)));
        assert!(result.is_err());
        assert_eq!(painter.transform(), before);
    }

    #[test]
    fn children_draw_in_their_own_frame() {
        let mut canvas = CanvasRenderObject::new(Size::new(10., 10.));
        canvas.set_paint_handler(|painter, rect| {
            painter.fill_rectangle(rect, &crate::graphics::Brush::solid(crate::Color::BLACK))
        });
        let mut root = RenderObject::new(StackLayout::new())
            .with_padding(Thickness::new(3., 4., 0., 0.))
            .with_child(RenderObject::new(canvas))
            .unwrap();
        measure_and_layout(&mut root, Rect::from_ltwh(0., 0., 40., 40.));

        let mut painter = RecordingPainter::new();
        root.draw(&mut painter);
        let fill = painter
            .commands()
            .iter()
            .find_map(|command| match command {
                DrawCommand::FillRectangle { rect, transform, .. } => Some((*rect, *transform)),
                _ => None,
            })
            .unwrap();
        assert_eq!(fill.0, Rect::from_ltwh(0., 0., 10., 10.));
        assert_eq!((fill.1.z.x, fill.1.z.y), (3., 4.));
    }

    #[derive(Debug, Default)]
    struct Counting {
        measures: usize,
    }

    impl RenderKind for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        fn child_mode(&self) -> ChildMode {
            ChildMode::None
        }

        fn measure_content(&mut self, _children: &mut [RenderObject], _available: Size) -> Size {
            self.measures += 1;
            Size::new(10., 10.)
        }

        fn layout_content(&mut self, _children: &mut [RenderObject], _content_rect: Rect) {}
    }

    fn measures(root: &RenderObject) -> usize {
        root.children()[0].kind::<Counting>().unwrap().measures
    }

    #[test]
    fn min_size_expands_the_measured_size() {
        let mut node = leaf(10., 10.).with_min_size(Size::new(30., 5.));
        node.measure(Size::infinite());
        assert_eq!(node.preferred_size(), Size::new(30., 10.));
    }

    #[test]
    fn max_size_bounds_available_and_result() {
        let mut node = leaf(80., 20.).with_max_size(Size::new(50., INFINITE_LENGTH));
        node.measure(Size::infinite());
        assert_eq!(node.preferred_size(), Size::new(50., 20.));

        // the available size still wins when smaller
        node.measure(Size::new(40., 100.));
        assert_eq!(node.preferred_size(), Size::new(40., 20.));
    }

    #[test]
    fn suggested_size_is_asked_for_within_available() {
        let mut node = leaf(10., 10.).with_suggested_size(Size::new(40., INFINITE_LENGTH));
        node.measure(Size::infinite());
        assert_eq!(node.preferred_size(), Size::new(40., 10.));

        node.measure(Size::new(30., 100.));
        assert_eq!(node.preferred_size(), Size::new(30., 10.));
    }

    #[test]
    fn upper_bound_wins_over_lower_bound() {
        let mut node = leaf(10., 10.)
            .with_min_size(Size::new(60., 0.))
            .with_max_size(Size::new(50., INFINITE_LENGTH));
        node.measure(Size::infinite());
        assert_eq!(node.preferred_size().width, 50.);
    }

    #[test]
    fn constraint_setters_take_effect_on_next_measure() {
        let mut node = leaf(10., 10.);
        measure_and_layout(&mut node, Rect::from_ltwh(0., 0., 100., 100.));
        assert_eq!(node.preferred_size(), Size::new(10., 10.));

        node.set_min_size(Size::new(20., 20.));
        node.measure(Size::new(100., 100.));
        assert_eq!(node.preferred_size(), Size::new(20., 20.));

        node.set_suggested_size(Size::new(INFINITE_LENGTH, 30.));
        node.set_max_size(Size::new(15., INFINITE_LENGTH));
        node.measure(Size::new(100., 100.));
        assert_eq!(node.preferred_size(), Size::new(15., 30.));
    }

    #[test]
    fn unchanged_subtree_skips_measure() {
        let mut root = RenderObject::new(StackLayout::new())
            .with_child(RenderObject::new(Counting::default()))
            .unwrap();
        let rect = Rect::from_ltwh(0., 0., 100., 100.);
        measure_and_layout(&mut root, rect);
        assert_eq!(measures(&root), 1);

        root.measure(rect.size);
        assert_eq!(measures(&root), 1);

        // a different available size measures again
        root.measure(Size::new(50., 50.));
        assert_eq!(measures(&root), 2);
        measure_and_layout(&mut root, rect);
        assert_eq!(measures(&root), 3);

        root.child_mut(0).unwrap().set_margin(Thickness::uniform(1.));
        measure_and_layout(&mut root, rect);
        assert_eq!(measures(&root), 4);

        let child = root.children()[0].id();
        root.find_mut(child).unwrap().set_padding(Thickness::uniform(1.));
        root.measure(rect.size);
        assert_eq!(measures(&root), 5);
    }
}
