//! Debounced layout and paint scheduling.
//!
//! Render objects never lay out or paint on their own. They mark the host dirty through an
//! [`Invalidator`], and the [`LayoutPaintCycler`] turns any number of those requests into at most
//! one relayout and one repaint per timer tick.

use crate::config::{CyclerConfig, RedrawPolicy};
use crate::error::HostError;
use crate::platform::{EventLoop, TimerCallback, TimerHandle};
use log::debug;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DirtyFlags {
    layout: bool,
    paint: bool,
}

/// A handle for marking a host's layout or paint dirty.
///
/// Every render object attached to a host holds a clone. Invalidating is idempotent: any number
/// of calls before the next tick result in a single pass.
#[derive(Debug, Clone)]
pub struct Invalidator(Arc<Mutex<DirtyFlags>>);

impl Invalidator {
    fn new() -> Invalidator {
        // nothing has been laid out yet
        Invalidator(Arc::new(Mutex::new(DirtyFlags {
            layout: true,
            paint: true,
        })))
    }

    /// Requests a relayout. A relayout is always followed by a repaint.
    pub fn invalidate_layout(&self) {
        self.0.lock().layout = true;
    }

    pub fn invalidate_paint(&self) {
        self.0.lock().paint = true;
    }

    pub fn is_layout_dirty(&self) -> bool {
        self.0.lock().layout
    }

    pub fn is_paint_dirty(&self) -> bool {
        self.0.lock().paint
    }

    fn take(&self) -> DirtyFlags {
        let mut flags = self.0.lock();
        let taken = *flags;
        flags.layout = false;
        flags.paint = false;
        taken
    }

    fn mark_all(&self) {
        let mut flags = self.0.lock();
        flags.layout = true;
        flags.paint = true;
    }
}

/// What a cycle runs against; usually the host's root and native window.
pub trait CycleTarget {
    /// Measures and lays out the whole tree.
    fn relayout(&mut self);

    /// Draws the whole tree into a fresh painter.
    fn repaint(&mut self) -> Result<(), HostError>;
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The tick came too early after the previous cycle.
    Skipped,
    /// Nothing was dirty.
    Idle,
    Painted,
    LaidOutAndPainted,
}

/// Counters for the passes a cycler has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleStats {
    pub ticks: u64,
    pub skipped: u64,
    pub layouts: u64,
    pub paints: u64,
}

/// Coalesces invalidations into timed layout and paint passes.
#[derive(Debug)]
pub struct LayoutPaintCycler {
    config: CyclerConfig,
    invalidator: Invalidator,
    last_cycle: Option<Instant>,
    timer: Option<TimerHandle>,
    stats: CycleStats,
}

impl LayoutPaintCycler {
    /// Creates a stopped cycler with layout and paint dirty.
    pub fn new(config: CyclerConfig) -> LayoutPaintCycler {
        LayoutPaintCycler {
            config,
            invalidator: Invalidator::new(),
            last_cycle: None,
            timer: None,
            stats: CycleStats::default(),
        }
    }

    pub fn config(&self) -> &CyclerConfig {
        &self.config
    }

    /// A handle to this cycler's dirty flags.
    pub fn invalidator(&self) -> Invalidator {
        self.invalidator.clone()
    }

    pub fn invalidate_layout(&self) {
        self.invalidator.invalidate_layout();
    }

    pub fn invalidate_paint(&self) {
        self.invalidator.invalidate_paint();
    }

    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    /// Registers a recurring timer at the configured interval. `on_tick` is expected to
    /// arrange for [`LayoutPaintCycler::tick`] to be called.
    ///
    /// Restarting replaces (and cancels) the previous timer.
    pub fn start(&mut self, event_loop: &dyn EventLoop, on_tick: TimerCallback) {
        self.timer = Some(event_loop.set_interval(self.config.interval, on_tick));
    }

    /// Cancels the timer.
    pub fn stop(&mut self) {
        self.timer = None;
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Runs at most one relayout and one repaint.
    ///
    /// Layout dirty means relayout and then repaint; paint dirty alone means repaint. Ticks that
    /// come within the configured interval of the previous one are skipped. Errors and panics
    /// from the target propagate to the caller; the flags consumed by a failed cycle stay clear
    /// until something is invalidated again.
    pub fn tick<T: CycleTarget + ?Sized>(
        &mut self,
        now: Instant,
        target: &mut T,
    ) -> Result<CycleOutcome, HostError> {
        self.stats.ticks += 1;
        if let Some(last) = self.last_cycle {
            let too_soon = match now.checked_duration_since(last) {
                Some(elapsed) => elapsed < self.config.interval,
                None => true,
            };
            if too_soon {
                self.stats.skipped += 1;
                return Ok(CycleOutcome::Skipped);
            }
        }
        self.last_cycle = Some(now);

        let flags = self.invalidator.take();
        if self.config.redraw == RedrawPolicy::Continuous {
            self.invalidator.mark_all();
        }

        let outcome = if flags.layout {
            debug!("cycle: relayout");
            target.relayout();
            self.stats.layouts += 1;
            target.repaint()?;
            self.stats.paints += 1;
            CycleOutcome::LaidOutAndPainted
        } else if flags.paint {
            target.repaint()?;
            self.stats.paints += 1;
            CycleOutcome::Painted
        } else {
            CycleOutcome::Idle
        };

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlatformError;
    use crate::platform::ManualEventLoop;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<&'static str>,
        fail_paint: bool,
    }

    impl CycleTarget for Recorder {
        fn relayout(&mut self) {
            self.calls.push("layout");
        }

        fn repaint(&mut self) -> Result<(), HostError> {
            self.calls.push("paint");
            if self.fail_paint {
                Err(PlatformError::PainterUnavailable("test".into()).into())
            } else {
                Ok(())
            }
        }
    }

    fn interval() -> Duration {
        CyclerConfig::default().interval
    }

    /// A cycler whose initial dirty state has already been consumed.
    fn settled(config: CyclerConfig, start: Instant) -> LayoutPaintCycler {
        let mut cycler = LayoutPaintCycler::new(config);
        cycler.tick(start, &mut Recorder::default()).unwrap();
        cycler
    }

    #[test]
    fn starts_dirty() {
        let mut cycler = LayoutPaintCycler::new(CyclerConfig::default());
        let mut target = Recorder::default();
        let outcome = cycler.tick(Instant::now(), &mut target).unwrap();
        assert_eq!(outcome, CycleOutcome::LaidOutAndPainted);
        assert_eq!(target.calls, vec!["layout", "paint"]);
    }

    #[test]
    fn coalesces_invalidations() {
        let start = Instant::now();
        let mut cycler = settled(CyclerConfig::default(), start);
        let invalidator = cycler.invalidator();
        for _ in 0..25 {
            invalidator.invalidate_layout();
            invalidator.invalidate_paint();
        }

        let mut target = Recorder::default();
        cycler.tick(start + interval(), &mut target).unwrap();
        assert_eq!(target.calls, vec!["layout", "paint"]);

        let stats = cycler.stats();
        assert_eq!((stats.layouts, stats.paints), (2, 2));
    }

    #[test]
    fn paint_only() {
        let start = Instant::now();
        let mut cycler = settled(CyclerConfig::default(), start);
        cycler.invalidate_paint();

        let mut target = Recorder::default();
        let outcome = cycler.tick(start + interval(), &mut target).unwrap();
        assert_eq!(outcome, CycleOutcome::Painted);
        assert_eq!(target.calls, vec!["paint"]);
    }

    #[test]
    fn skips_ticks_within_the_interval() {
        let start = Instant::now();
        let mut cycler = settled(CyclerConfig::default(), start);
        cycler.invalidate_layout();

        let mut target = Recorder::default();
        let early = start + interval() / 2;
        assert_eq!(cycler.tick(early, &mut target).unwrap(), CycleOutcome::Skipped);
        assert!(target.calls.is_empty());
        assert!(cycler.invalidator().is_layout_dirty());

        let outcome = cycler.tick(start + interval(), &mut target).unwrap();
        assert_eq!(outcome, CycleOutcome::LaidOutAndPainted);
        assert_eq!(cycler.stats().skipped, 1);
    }

    #[test]
    fn on_demand_goes_idle() {
        let start = Instant::now();
        let mut cycler = settled(CyclerConfig::default(), start);

        let mut target = Recorder::default();
        let outcome = cycler.tick(start + interval(), &mut target).unwrap();
        assert_eq!(outcome, CycleOutcome::Idle);
        assert!(target.calls.is_empty());
    }

    #[test]
    fn continuous_redraws_every_tick() {
        let config = CyclerConfig::default().with_redraw(RedrawPolicy::Continuous);
        let start = Instant::now();
        let mut cycler = settled(config, start);
        assert!(cycler.invalidator().is_layout_dirty());
        assert!(cycler.invalidator().is_paint_dirty());

        let mut target = Recorder::default();
        for i in 1..=3 {
            cycler.tick(start + interval() * i, &mut target).unwrap();
        }
        assert_eq!(
            target.calls,
            vec!["layout", "paint", "layout", "paint", "layout", "paint"]
        );
    }

    #[test]
    fn repaint_errors_propagate() {
        let mut cycler = LayoutPaintCycler::new(CyclerConfig::default());
        let mut target = Recorder {
            fail_paint: true,
            ..Recorder::default()
        };
        let err = cycler.tick(Instant::now(), &mut target).unwrap_err();
        assert_eq!(
            err,
            HostError::Platform(PlatformError::PainterUnavailable("test".into()))
        );
        assert_eq!(cycler.stats().paints, 0);
    }

    #[test]
    fn stopping_cancels_the_timer() {
        let event_loop = ManualEventLoop::new();
        let mut cycler = LayoutPaintCycler::new(CyclerConfig::default());
        cycler.start(&event_loop, Box::new(|_| {}));
        assert!(cycler.is_running());
        assert_eq!(event_loop.timer_count(), 1);

        cycler.stop();
        assert_eq!(event_loop.timer_count(), 0);

        cycler.start(&event_loop, Box::new(|_| {}));
        drop(cycler);
        assert_eq!(event_loop.timer_count(), 0);
    }
}
