//! The boundary to the native windowing system.
//!
//! A [`NativeWindow`] hands out painters and reports its client size, and an [`EventLoop`]
//! provides recurring timers. Native callbacks are not delivered through these traits; the
//! backend turns them into [`NativeEvent`]s and sends them to the host's event channel.

use crate::error::PlatformError;
use crate::events::{KeyCode, KeyModifiers, MouseButton};
use crate::graphics::Painter;
use crate::rect::Point;
use crate::size::Size;
use core::fmt;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

/// A native window.
pub trait NativeWindow {
    /// Size of the client area.
    fn client_size(&self) -> Size;
    fn set_client_size(&mut self, size: Size);

    /// Acquires a painter for one paint pass. The painter is released when dropped.
    fn begin_paint(&mut self) -> Result<Box<dyn Painter + '_>, PlatformError>;

    /// Asks the platform to send a paint event soon.
    fn request_repaint(&mut self);

    /// Returns false if the platform refused to capture the mouse.
    fn capture_mouse(&mut self) -> bool;
    fn release_mouse(&mut self);

    /// Mouse position in client coordinates.
    fn mouse_position(&self) -> Point;
}

/// A timer callback. Receives the time the timer fired at.
pub type TimerCallback = Box<dyn FnMut(Instant) + Send>;

/// A platform event loop, as far as the render engine needs one.
pub trait EventLoop {
    /// Calls `callback` every `period` until the returned handle is dropped.
    fn set_interval(&self, period: Duration, callback: TimerCallback) -> TimerHandle;
}

/// Cancels a timer when dropped.
pub struct TimerHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TimerHandle {
    pub fn new<F: 'static + FnOnce() + Send>(cancel: F) -> TimerHandle {
        TimerHandle {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Cancels the timer now.
    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TimerHandle {{ active: {} }}", self.cancel.is_some())
    }
}

struct ManualTimer {
    id: u64,
    period: Duration,
    next: Instant,
    // taken out while the callback runs
    callback: Option<TimerCallback>,
}

struct ManualLoopState {
    now: Instant,
    next_id: u64,
    timers: Vec<ManualTimer>,
}

/// A deterministic event loop with a virtual clock.
///
/// Time only moves when [`ManualEventLoop::advance`] is called, which fires every timer that
/// comes due in order. Useful for tests and for embedders that drive frames themselves.
#[derive(Clone)]
pub struct ManualEventLoop {
    state: Arc<Mutex<ManualLoopState>>,
}

impl ManualEventLoop {
    pub fn new() -> ManualEventLoop {
        ManualEventLoop {
            state: Arc::new(Mutex::new(ManualLoopState {
                now: Instant::now(),
                next_id: 0,
                timers: Vec::new(),
            })),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Instant {
        self.state.lock().now
    }

    /// Number of timers that have not been cancelled.
    pub fn timer_count(&self) -> usize {
        self.state.lock().timers.len()
    }

    /// Moves the clock forward, firing due timers along the way.
    pub fn advance(&self, duration: Duration) {
        let target = self.state.lock().now + duration;

        loop {
            let (id, fire_at, mut callback) = {
                let mut state = self.state.lock();
                let due = state
                    .timers
                    .iter_mut()
                    .filter(|timer| timer.next <= target && timer.callback.is_some())
                    .min_by_key(|timer| timer.next);
                let timer = match due {
                    Some(timer) => timer,
                    None => break,
                };
                let fire_at = timer.next;
                timer.next += timer.period;
                let id = timer.id;
                let callback = timer.callback.take();
                state.now = fire_at;
                match callback {
                    Some(callback) => (id, fire_at, callback),
                    None => break,
                }
            };

            // the lock is released so the callback may add or cancel timers
            callback(fire_at);

            let mut state = self.state.lock();
            if let Some(timer) = state.timers.iter_mut().find(|timer| timer.id == id) {
                timer.callback = Some(callback);
            }
        }

        self.state.lock().now = target;
    }
}

impl Default for ManualEventLoop {
    fn default() -> Self {
        ManualEventLoop::new()
    }
}

impl fmt::Debug for ManualEventLoop {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ManualEventLoop")
            .field("now", &state.now)
            .field("timers", &state.timers.len())
            .finish()
    }
}

impl EventLoop for ManualEventLoop {
    fn set_interval(&self, period: Duration, callback: TimerCallback) -> TimerHandle {
        debug_assert!(period > Duration::from_secs(0), "zero timer period");

        let id = {
            let mut state = self.state.lock();
            let id = state.next_id;
            state.next_id += 1;
            let next = state.now + period;
            state.timers.push(ManualTimer {
                id,
                period,
                next,
                callback: Some(callback),
            });
            id
        };

        let state: Weak<Mutex<ManualLoopState>> = Arc::downgrade(&self.state);
        TimerHandle::new(move || {
            if let Some(state) = state.upgrade() {
                state.lock().timers.retain(|timer| timer.id != id);
            }
        })
    }
}

/// Events sent by the native window.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeEvent {
    /// The client area was resized.
    Resize(Size),
    /// The platform wants the window painted. Handled on the next tick.
    Paint,
    FocusGained,
    FocusLost,
    MouseEnter,
    MouseLeave,
    MouseMove(Point),
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
    /// The native window is gone.
    Destroy,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn manual_loop_fires_due_timers() {
        let event_loop = ManualEventLoop::new();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let _timer = event_loop.set_interval(
            Duration::from_millis(10),
            Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        event_loop.advance(Duration::from_millis(9));
        assert_eq!(count.load(Ordering::SeqCst), 0);
        event_loop.advance(Duration::from_millis(25));
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn timer_passes_fire_time() {
        let event_loop = ManualEventLoop::new();
        let start = event_loop.now();
        let fired = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&fired);
        let _timer = event_loop.set_interval(
            Duration::from_millis(5),
            Box::new(move |now| sink.lock().push(now)),
        );

        event_loop.advance(Duration::from_millis(12));
        let offsets: Vec<_> = fired.lock().iter().map(|t| *t - start).collect();
        assert_eq!(
            offsets,
            vec![Duration::from_millis(5), Duration::from_millis(10)]
        );
        assert_eq!(event_loop.now() - start, Duration::from_millis(12));
    }

    #[test]
    fn dropping_the_handle_cancels() {
        let event_loop = ManualEventLoop::new();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let timer = event_loop.set_interval(
            Duration::from_millis(1),
            Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        assert_eq!(event_loop.timer_count(), 1);

        drop(timer);
        assert_eq!(event_loop.timer_count(), 0);
        event_loop.advance(Duration::from_millis(10));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
