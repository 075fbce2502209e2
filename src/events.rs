//! Events.

use crate::rect::Point;
use crate::render_object::ControlId;
use core::fmt;
use parking_lot::Mutex;
use std::sync::Arc;

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// Modifier keys held during an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyModifiers {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    /// The command key on macOS, the Windows key elsewhere.
    pub command: bool,
}

impl KeyModifiers {
    pub const NONE: KeyModifiers = KeyModifiers {
        shift: false,
        control: false,
        alt: false,
        command: false,
    };

    pub fn is_empty(&self) -> bool {
        *self == KeyModifiers::NONE
    }
}

/// Keyboard layout-independent identifiers for keyboard keys.
///
/// Character keys are identified by the unshifted character they produce on a US layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Character(char),
    Return,
    Tab,
    Space,
    Backspace,
    Delete,
    Escape,
    LeftArrow,
    RightArrow,
    UpArrow,
    DownArrow,
    Home,
    End,
    PageUp,
    PageDown,
    /// F1 is `Function(1)`.
    Function(u8),
}

/// Direction of a focus change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusChange {
    Gained,
    Lost,
}

/// An input event as seen by controls. Points are in window coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    MouseEnter {
        point: Option<Point>,
    },
    MouseLeave,
    MouseMove {
        point: Point,
    },
    MouseDown {
        button: MouseButton,
        point: Point,
        modifiers: KeyModifiers,
    },
    MouseUp {
        button: MouseButton,
        point: Point,
        modifiers: KeyModifiers,
    },
    MouseWheel {
        delta: f64,
        point: Point,
        modifiers: KeyModifiers,
    },
    KeyDown {
        key: KeyCode,
        modifiers: KeyModifiers,
    },
    KeyUp {
        key: KeyCode,
        modifiers: KeyModifiers,
    },
    Focus {
        change: FocusChange,
        /// True if the window itself gained or lost focus, false if focus moved between controls.
        window: bool,
    },
}

/// Which way a routed event is travelling.
///
/// Events first tunnel from the outermost control down to the target, then bubble back up.
/// Either pass stops at the first control that handles the event. Afterwards every control on
/// the route gets a direct notification, handled or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutePhase {
    Tunnel,
    Bubble,
    Direct,
}

/// An event on its way through the control ancestry.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedEvent {
    /// The control the event was dispatched to.
    pub original_sender: ControlId,
    /// The control currently receiving the event.
    pub sender: ControlId,
    pub phase: RoutePhase,
    pub event: UiEvent,
}

/// An event handler. Returns true if it handled the event, which stops routing.
pub struct EventHandler(Arc<Mutex<dyn FnMut(&RoutedEvent) -> bool + Send>>);

impl Clone for EventHandler {
    fn clone(&self) -> Self {
        EventHandler(Arc::clone(&self.0))
    }
}

impl EventHandler {
    pub fn new<F: 'static + FnMut(&RoutedEvent) -> bool + Send>(handler: F) -> Self {
        EventHandler(Arc::new(Mutex::new(handler)))
    }

    pub fn call(&self, event: &RoutedEvent) -> bool {
        let mut handler = self.0.lock();
        (&mut *handler)(event)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EventHandler")
    }
}
