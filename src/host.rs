//! Connects a render tree to a native window.

use crate::color::Color;
use crate::config::HostConfig;
use crate::cycler::{CycleOutcome, CycleStats, CycleTarget, LayoutPaintCycler};
use crate::error::{HostError, PlatformError};
use crate::events::{EventHandler, FocusChange, RoutePhase, RoutedEvent, UiEvent};
use crate::platform::{EventLoop, NativeEvent, NativeWindow};
use crate::rect::{Point, Rect};
use crate::render_object::{ControlId, RenderObject};
use crate::size::{is_infinite_length, Size};
use crate::window::WindowRenderObject;
use cgmath::EuclideanSpace;
use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use log::{debug, error, trace};
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// Messages the host receives through its event queue.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// An event from the native window.
    Native(NativeEvent),
    /// The cycler's timer fired.
    Tick(Instant),
}

/// Runs once the next layout pass has finished. Receives the root.
pub type AfterLayoutAction = Box<dyn FnOnce(&mut RenderObject)>;

/// The part of the host a layout/paint cycle runs against.
struct Surface {
    root: RenderObject,
    window: Box<dyn NativeWindow>,
    clear_color: Color,
    after_layout: Vec<AfterLayoutAction>,
}

impl Surface {
    fn relayout_with_size(&mut self, available: Size, fit_window_to_content: bool) {
        debug!("relayout begins, available {:?}", available);

        self.root.measure(available);
        let preferred = self.root.preferred_size();
        let pick = |available: f64, preferred: f64| {
            if fit_window_to_content || is_infinite_length(available) {
                preferred
            } else {
                available
            }
        };
        let size = Size::new(
            pick(available.width, preferred.width),
            pick(available.height, preferred.height),
        );
        if fit_window_to_content {
            self.window.set_client_size(size);
        }
        self.root.layout(Rect::new(Point::origin(), size));

        for action in std::mem::take(&mut self.after_layout) {
            action(&mut self.root);
        }
        debug!("relayout ends, size {:?}", size);
    }
}

impl CycleTarget for Surface {
    /// Lays out against the client size. A window without a client size is fitted to its
    /// content.
    fn relayout(&mut self) {
        let client_size = self.window.client_size();
        if client_size == Size::zero() {
            self.relayout_with_size(Size::infinite(), true);
        } else {
            self.relayout_with_size(client_size, false);
        }
    }

    fn repaint(&mut self) -> Result<(), HostError> {
        let mut painter = self.window.begin_paint()?;
        painter.clear(self.clear_color);
        self.root.draw(&mut *painter);
        painter.end_draw();
        Ok(())
    }
}

/// Hosts a render tree in a native window.
///
/// The host owns the tree (rooted at a [`WindowRenderObject`]) and the native window, schedules
/// layout and paint passes through a [`LayoutPaintCycler`], and routes native input to the
/// controls attached to the tree.
///
/// Native events and timer ticks arrive through a channel; nothing happens until
/// [`WindowHost::poll`] is called.
pub struct WindowHost {
    surface: Surface,
    cycler: LayoutPaintCycler,
    event_sender: Sender<HostEvent>,
    event_recv: Receiver<HostEvent>,
    handlers: HashMap<ControlId, Vec<EventHandler>>,
    root_control: ControlId,
    focus: ControlId,
    hover: Option<ControlId>,
    capture: Option<ControlId>,
    destroyed: bool,
}

impl WindowHost {
    /// Creates a host showing `content` in `window`, and starts the cycler's timer on
    /// `event_loop`.
    ///
    /// The tree is laid out and painted on the first tick.
    pub fn new(
        content: RenderObject,
        window: Box<dyn NativeWindow>,
        event_loop: &dyn EventLoop,
        config: HostConfig,
    ) -> WindowHost {
        let root_control = ControlId::new();
        let mut root = RenderObject::new(WindowRenderObject::new()).with_control(root_control);
        let attached = root.add_child(content, 0);
        debug_assert!(attached.is_ok(), "a fresh window root takes one child");

        let mut cycler = LayoutPaintCycler::new(config.cycler);
        root.set_host_recursive(Some(cycler.invalidator()));

        let (event_sender, event_recv) = channel::unbounded();
        let ticks = event_sender.clone();
        cycler.start(
            event_loop,
            Box::new(move |now| {
                if let Err(err) = ticks.send(HostEvent::Tick(now)) {
                    debug!("dropping tick: {}", err);
                }
            }),
        );

        WindowHost {
            surface: Surface {
                root,
                window,
                clear_color: config.clear_color,
                after_layout: Vec::new(),
            },
            cycler,
            event_sender,
            event_recv,
            handlers: HashMap::new(),
            root_control,
            focus: root_control,
            hover: None,
            capture: None,
            destroyed: false,
        }
    }

    /// A sender for delivering native events (and ticks) to this host.
    pub fn event_sender(&self) -> Sender<HostEvent> {
        self.event_sender.clone()
    }

    /// Receives all events from the event queue and handles them.
    ///
    /// A layout/paint cycle that fails, whether through a painter error or a panic, is logged
    /// and skipped.
    pub fn poll(&mut self) {
        loop {
            match self.event_recv.try_recv() {
                Ok(event) => self.handle_event(event),
                Err(TryRecvError::Empty) => break,
                // the host holds a sender itself
                Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    fn handle_event(&mut self, event: HostEvent) {
        if self.destroyed {
            trace!("window destroyed, dropping {:?}", event);
            return;
        }
        match event {
            HostEvent::Tick(now) => {
                if let Err(err) = self.tick(now) {
                    error!("skipping layout/paint cycle: {}", err);
                }
            }
            HostEvent::Native(event) => self.handle_native_event(event),
        }
    }

    /// Runs one cycle of the scheduler now.
    pub fn tick(&mut self, now: Instant) -> Result<CycleOutcome, HostError> {
        if self.destroyed {
            return Err(PlatformError::WindowDestroyed.into());
        }
        let cycler = &mut self.cycler;
        let surface = &mut self.surface;
        contain(|| cycler.tick(now, surface))
    }

    fn handle_native_event(&mut self, event: NativeEvent) {
        match event {
            NativeEvent::Resize(size) => {
                debug!("window resized to {:?}", size);
                self.invalidate_layout();
            }
            NativeEvent::Paint => self.invalidate_paint(),
            NativeEvent::FocusGained => self.dispatch(
                self.focus,
                None,
                UiEvent::Focus {
                    change: FocusChange::Gained,
                    window: true,
                },
            ),
            NativeEvent::FocusLost => self.dispatch(
                self.focus,
                None,
                UiEvent::Focus {
                    change: FocusChange::Lost,
                    window: true,
                },
            ),
            NativeEvent::MouseEnter => (),
            NativeEvent::MouseLeave => {
                if let Some(hover) = self.hover.take() {
                    self.dispatch(hover, None, UiEvent::MouseLeave);
                }
            }
            NativeEvent::MouseMove(point) => self.on_mouse_move(point),
            NativeEvent::MouseDown {
                button,
                point,
                modifiers,
            } => {
                let target = self.mouse_target(point);
                self.dispatch(
                    target,
                    None,
                    UiEvent::MouseDown {
                        button,
                        point,
                        modifiers,
                    },
                );
            }
            NativeEvent::MouseUp {
                button,
                point,
                modifiers,
            } => {
                let target = self.mouse_target(point);
                self.dispatch(
                    target,
                    None,
                    UiEvent::MouseUp {
                        button,
                        point,
                        modifiers,
                    },
                );
            }
            NativeEvent::MouseWheel {
                delta,
                point,
                modifiers,
            } => {
                let target = self.mouse_target(point);
                self.dispatch(
                    target,
                    None,
                    UiEvent::MouseWheel {
                        delta,
                        point,
                        modifiers,
                    },
                );
            }
            NativeEvent::KeyDown { key, modifiers } => {
                self.dispatch(self.focus, None, UiEvent::KeyDown { key, modifiers })
            }
            NativeEvent::KeyUp { key, modifiers } => {
                self.dispatch(self.focus, None, UiEvent::KeyUp { key, modifiers })
            }
            NativeEvent::Destroy => self.on_destroy(),
        }
    }

    fn mouse_target(&self, point: Point) -> ControlId {
        match self.capture {
            Some(capture) => capture,
            None => self.hit_test(point),
        }
    }

    fn on_mouse_move(&mut self, point: Point) {
        let new_hover = self.hit_test(point);
        let old_hover = self.hover.replace(new_hover);

        if let Some(capture) = self.capture {
            // hover changes are only reported between the captured control and its ancestors
            let new_common = self.lowest_common_ancestor(Some(new_hover), Some(capture));
            let old_common = self.lowest_common_ancestor(old_hover, Some(capture));
            if self.is_ancestor(old_common, new_common) {
                if let Some(old_common) = old_common {
                    self.dispatch(old_common, new_common, UiEvent::MouseLeave);
                }
            } else if let Some(new_common) = new_common {
                self.dispatch(
                    new_common,
                    old_common,
                    UiEvent::MouseEnter { point: Some(point) },
                );
            }
            self.dispatch(capture, None, UiEvent::MouseMove { point });
            return;
        }

        self.dispatch_hover_change(old_hover, Some(new_hover), Some(point), false, false);
        self.dispatch(new_hover, None, UiEvent::MouseMove { point });
    }

    fn on_destroy(&mut self) {
        debug!("native window destroyed");
        if let Some(hover) = self.hover.take() {
            self.dispatch(hover, None, UiEvent::MouseLeave);
        }
        self.capture = None;
        self.cycler.stop();
        self.destroyed = true;
    }

    /// Sends leave events from `old` and enter events to `new`, each stopping below their
    /// lowest common ancestor.
    fn dispatch_hover_change(
        &mut self,
        old: Option<ControlId>,
        new: Option<ControlId>,
        point: Option<Point>,
        no_leave: bool,
        no_enter: bool,
    ) {
        if old == new {
            return;
        }
        let common = self.lowest_common_ancestor(old, new);
        if let (false, Some(old)) = (no_leave, old) {
            self.dispatch(old, common, UiEvent::MouseLeave);
        }
        if let (false, Some(new)) = (no_enter, new) {
            self.dispatch(new, common, UiEvent::MouseEnter { point });
        }
    }

    /// Routes `event` from `target` through its ancestor controls, up to but excluding
    /// `stop_at`.
    fn dispatch(&mut self, target: ControlId, stop_at: Option<ControlId>, event: UiEvent) {
        if Some(target) == stop_at {
            return;
        }
        let route: Vec<ControlId> = self
            .control_chain(target)
            .into_iter()
            .take_while(|control| Some(*control) != stop_at)
            .collect();
        trace!("dispatching {:?} to {} controls", event, route.len());

        let handled = route
            .iter()
            .rev()
            .any(|&control| self.raise(control, target, RoutePhase::Tunnel, &event));
        if !handled {
            for &control in &route {
                if self.raise(control, target, RoutePhase::Bubble, &event) {
                    trace!("{:?} handled while bubbling", event);
                    break;
                }
            }
        }
        for &control in &route {
            self.raise(control, target, RoutePhase::Direct, &event);
        }
    }

    /// Calls every handler of `control`. Returns true if any of them handled the event.
    fn raise(
        &self,
        control: ControlId,
        original_sender: ControlId,
        phase: RoutePhase,
        event: &UiEvent,
    ) -> bool {
        let handlers = match self.handlers.get(&control) {
            Some(handlers) => handlers.clone(),
            None => return false,
        };
        let routed = RoutedEvent {
            original_sender,
            sender: control,
            phase,
            event: event.clone(),
        };
        let mut handled = false;
        for handler in handlers {
            handled |= handler.call(&routed);
        }
        handled
    }

    /// `control` and the controls attached above it, nearest first.
    fn control_chain(&self, control: ControlId) -> Vec<ControlId> {
        let root = &self.surface.root;
        match root.find_control(control) {
            Some(node) => root.control_ancestry(node.id()),
            None => vec![control],
        }
    }

    fn lowest_common_ancestor(
        &self,
        left: Option<ControlId>,
        right: Option<ControlId>,
    ) -> Option<ControlId> {
        let left = self.control_chain(left?);
        let right = self.control_chain(right?);
        if left.last() != right.last() {
            return None;
        }
        left.into_iter().find(|control| right.contains(control))
    }

    /// Whether `ancestor` is `control` or one of its ancestors.
    fn is_ancestor(&self, control: Option<ControlId>, ancestor: Option<ControlId>) -> bool {
        match (control, ancestor) {
            (Some(control), Some(ancestor)) => self.control_chain(control).contains(&ancestor),
            _ => false,
        }
    }

    /// Registers a handler for events routed through `control`.
    pub fn add_event_handler(&mut self, control: ControlId, handler: EventHandler) {
        self.handlers.entry(control).or_default().push(handler);
    }

    pub fn clear_event_handlers(&mut self, control: ControlId) {
        self.handlers.remove(&control);
    }

    /// The control under `point` (in window coordinates): the nearest control attached to the
    /// deepest node hit, or the window's own control.
    pub fn hit_test(&self, point: Point) -> ControlId {
        let root = &self.surface.root;
        root.hit_test(point)
            .and_then(|node| root.control_ancestry(node.id()).first().copied())
            .unwrap_or(self.root_control)
    }

    /// Moves focus to `control`, or back to the window if `None`. Sends a lose event to the
    /// previous focus and a gain event to the new one.
    pub fn set_focus(&mut self, control: Option<ControlId>) -> bool {
        let control = control.unwrap_or(self.root_control);
        if control == self.focus {
            return true;
        }
        let old = std::mem::replace(&mut self.focus, control);
        self.dispatch(
            old,
            None,
            UiEvent::Focus {
                change: FocusChange::Lost,
                window: false,
            },
        );
        self.dispatch(
            control,
            None,
            UiEvent::Focus {
                change: FocusChange::Gained,
                window: false,
            },
        );
        true
    }

    /// Routes all mouse input to `control`, or releases the capture if `None`.
    ///
    /// Fails if another control holds the capture or the platform refuses it. While captured,
    /// the hover leaves every control that is not an ancestor of the captured one.
    pub fn capture_mouse_for(&mut self, control: Option<ControlId>) -> bool {
        if self.destroyed {
            return false;
        }
        if control == self.capture {
            return true;
        }

        match control {
            None => {
                let old = self.capture.take();
                self.surface.window.release_mouse();
                if old != self.hover {
                    let point = self.surface.window.mouse_position();
                    self.dispatch_hover_change(old, self.hover, Some(point), true, false);
                }
                true
            }
            Some(control) => {
                if self.capture.is_some() {
                    return false;
                }
                if !self.surface.window.capture_mouse() {
                    return false;
                }
                self.capture = Some(control);
                let point = self.surface.window.mouse_position();
                self.dispatch_hover_change(self.hover, Some(control), Some(point), false, true);
                true
            }
        }
    }

    /// Runs `action` now if the layout is up to date, or after the next layout pass.
    pub fn run_after_layout_stable<F: 'static + FnOnce(&mut RenderObject)>(&mut self, action: F) {
        if self.cycler.invalidator().is_layout_dirty() {
            self.surface.after_layout.push(Box::new(action));
        } else {
            action(&mut self.surface.root);
        }
    }

    /// Size of the root after the last layout.
    pub fn current_size(&self) -> Size {
        self.surface.root.size()
    }

    /// Lays the tree out against the window's client size right away, and schedules a repaint.
    pub fn relayout(&mut self) {
        self.surface.relayout();
        self.request_repaint();
    }

    /// Lays the tree out against `available` right away. With `fit_window_to_content`, the
    /// window's client area is resized to the root's preferred size.
    pub fn relayout_with_size(&mut self, available: Size, fit_window_to_content: bool) {
        self.surface
            .relayout_with_size(available, fit_window_to_content);
        self.request_repaint();
    }

    /// Schedules a paint on the next tick and asks the platform for a paint event.
    fn request_repaint(&mut self) {
        self.invalidate_paint();
        self.surface.window.request_repaint();
    }

    /// Paints the tree right away.
    pub fn repaint(&mut self) -> Result<(), HostError> {
        let surface = &mut self.surface;
        contain(|| surface.repaint())
    }

    pub fn invalidate_layout(&self) {
        self.cycler.invalidate_layout();
    }

    pub fn invalidate_paint(&self) {
        self.cycler.invalidate_paint();
    }

    /// The window render object at the root of the tree.
    pub fn root(&self) -> &RenderObject {
        &self.surface.root
    }

    pub fn root_mut(&mut self) -> &mut RenderObject {
        &mut self.surface.root
    }

    /// The content passed to [`WindowHost::new`].
    pub fn content(&self) -> Option<&RenderObject> {
        self.surface.root.child(0)
    }

    pub fn content_mut(&mut self) -> Option<&mut RenderObject> {
        self.surface.root.child_mut(0)
    }

    pub fn window(&self) -> &dyn NativeWindow {
        &*self.surface.window
    }

    pub fn window_mut(&mut self) -> &mut dyn NativeWindow {
        &mut *self.surface.window
    }

    /// The control attached to the root, which stands for the window itself.
    pub fn root_control(&self) -> ControlId {
        self.root_control
    }

    pub fn focus(&self) -> ControlId {
        self.focus
    }

    pub fn hover(&self) -> Option<ControlId> {
        self.hover
    }

    pub fn mouse_capture(&self) -> Option<ControlId> {
        self.capture
    }

    pub fn stats(&self) -> CycleStats {
        self.cycler.stats()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

/// Runs `f`, turning a panic into [`HostError::CyclePanicked`].
fn contain<R, F: FnOnce() -> Result<R, HostError>>(f: F) -> Result<R, HostError> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(HostError::CyclePanicked(panic_message(&*payload))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::CanvasRenderObject;
    use crate::headless::HeadlessWindow;
    use crate::platform::ManualEventLoop;
    use crate::stack::StackLayout;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn host_with(content: RenderObject, size: Size) -> WindowHost {
        let event_loop = ManualEventLoop::new();
        WindowHost::new(
            content,
            Box::new(HeadlessWindow::new(size)),
            &event_loop,
            HostConfig::default(),
        )
    }

    /// A stack with two controls: `outer` on the stack and `inner` on a canvas inside it.
    fn nested() -> (RenderObject, ControlId, ControlId) {
        let outer = ControlId::new();
        let inner = ControlId::new();
        let content = RenderObject::new(StackLayout::new())
            .with_control(outer)
            .with_child(
                RenderObject::new(CanvasRenderObject::new(Size::new(20., 20.)))
                    .with_control(inner),
            )
            .unwrap();
        (content, outer, inner)
    }

    fn log_events(host: &mut WindowHost, control: ControlId, log: &Arc<Mutex<Vec<String>>>) {
        let log = Arc::clone(log);
        host.add_event_handler(
            control,
            EventHandler::new(move |event| {
                if event.phase == RoutePhase::Bubble {
                    log.lock().push(format!("{:?}", event.event));
                }
                false
            }),
        );
    }

    #[test]
    fn hit_test_falls_back_to_ancestor_controls() {
        let (content, outer, inner) = nested();
        let mut host = host_with(content, Size::new(100., 100.));
        host.relayout();

        assert_eq!(host.hit_test(Point::new(5., 5.)), inner);
        assert_eq!(host.hit_test(Point::new(50., 50.)), outer);
        assert_eq!(host.hit_test(Point::new(500., 50.)), host.root_control());
    }

    #[test]
    fn lowest_common_ancestor_of_siblings() {
        let outer = ControlId::new();
        let (a, b) = (ControlId::new(), ControlId::new());
        let content = RenderObject::new(StackLayout::new())
            .with_control(outer)
            .with_child(RenderObject::new(CanvasRenderObject::new(Size::zero())).with_control(a))
            .unwrap()
            .with_child(RenderObject::new(CanvasRenderObject::new(Size::zero())).with_control(b))
            .unwrap();
        let host = host_with(content, Size::new(10., 10.));

        assert_eq!(host.lowest_common_ancestor(Some(a), Some(b)), Some(outer));
        assert_eq!(host.lowest_common_ancestor(Some(a), Some(outer)), Some(outer));
        assert_eq!(host.lowest_common_ancestor(Some(a), None), None);
        assert_eq!(
            host.lowest_common_ancestor(Some(a), Some(ControlId::new())),
            None
        );
        assert!(host.is_ancestor(Some(a), Some(outer)));
        assert!(!host.is_ancestor(Some(outer), Some(a)));
    }

    #[test]
    fn tunnel_handler_stops_bubbling_but_not_direct() {
        let (content, outer, inner) = nested();
        let mut host = host_with(content, Size::new(100., 100.));
        let phases = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&phases);
        host.add_event_handler(
            outer,
            EventHandler::new(move |event| {
                seen.lock().push(("outer", event.phase));
                event.phase == RoutePhase::Tunnel
            }),
        );
        let seen = Arc::clone(&phases);
        host.add_event_handler(
            inner,
            EventHandler::new(move |event| {
                seen.lock().push(("inner", event.phase));
                false
            }),
        );

        host.dispatch(inner, None, UiEvent::MouseLeave);
        assert_eq!(
            *phases.lock(),
            vec![
                ("outer", RoutePhase::Tunnel),
                ("inner", RoutePhase::Direct),
                ("outer", RoutePhase::Direct),
            ]
        );
    }

    #[test]
    fn moving_between_siblings_stops_at_their_ancestor() {
        let (content, outer, inner) = nested();
        let mut host = host_with(content, Size::new(100., 100.));
        host.relayout();
        let log = Arc::new(Mutex::new(Vec::new()));
        log_events(&mut host, outer, &log);
        log_events(&mut host, inner, &log);

        host.handle_native_event(NativeEvent::MouseMove(Point::new(50., 50.)));
        log.lock().clear();
        host.handle_native_event(NativeEvent::MouseMove(Point::new(5., 5.)));

        // outer is the common ancestor, so it neither leaves nor enters
        assert_eq!(
            *log.lock(),
            vec![
                format!("{:?}", UiEvent::MouseEnter { point: Some(Point::new(5., 5.)) }),
                format!("{:?}", UiEvent::MouseMove { point: Point::new(5., 5.) }),
                format!("{:?}", UiEvent::MouseMove { point: Point::new(5., 5.) }),
            ]
        );
        assert_eq!(host.hover(), Some(inner));
    }

    #[test]
    fn after_layout_actions_wait_for_layout() {
        let (content, _, _) = nested();
        let mut host = host_with(content, Size::new(100., 100.));
        let sizes = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&sizes);
        host.run_after_layout_stable(move |root| seen.lock().push(root.size()));
        assert!(sizes.lock().is_empty());

        let now = Instant::now();
        host.tick(now).unwrap();
        assert_eq!(*sizes.lock(), vec![Size::new(100., 100.)]);

        let seen = Arc::clone(&sizes);
        host.run_after_layout_stable(move |root| seen.lock().push(root.size()));
        assert_eq!(sizes.lock().len(), 2);
    }

    #[test]
    fn zero_client_size_fits_the_window_to_content() {
        let (content, _, _) = nested();
        let mut host = host_with(content, Size::zero());
        host.relayout();
        assert_eq!(host.current_size(), Size::new(20., 20.));
        assert_eq!(host.window().client_size(), Size::new(20., 20.));
    }

    #[test]
    fn panics_are_reported_as_errors() {
        let mut canvas = CanvasRenderObject::new(Size::new(10., 10.));
        canvas.set_paint_handler(|_, _| panic!("canvas exploded"));
        let mut host = host_with(RenderObject::new(canvas), Size::new(50., 50.));
        host.relayout();
        assert_eq!(
            host.repaint(),
            Err(HostError::CyclePanicked("canvas exploded".to_string()))
        );
    }
}
