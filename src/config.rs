//! Host and scheduler configuration.

use crate::color::Color;
use std::time::Duration;

/// What the layout/paint cycler does with its dirty flags after running a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedrawPolicy {
    /// Clear both flags; nothing runs until something is invalidated again.
    OnDemand,
    /// Mark both flags dirty again, so every tick relayouts and repaints.
    Continuous,
}

/// Settings for [`LayoutPaintCycler`](crate::LayoutPaintCycler).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CyclerConfig {
    /// Tick period, and the minimum time between two cycles.
    pub interval: Duration,
    pub redraw: RedrawPolicy,
}

impl CyclerConfig {
    /// Roughly 144 cycles per second.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_micros(1_000_000 / 144);

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_redraw(mut self, redraw: RedrawPolicy) -> Self {
        self.redraw = redraw;
        self
    }
}

impl Default for CyclerConfig {
    fn default() -> Self {
        CyclerConfig {
            interval: CyclerConfig::DEFAULT_INTERVAL,
            redraw: RedrawPolicy::OnDemand,
        }
    }
}

/// Settings for [`WindowHost`](crate::WindowHost).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostConfig {
    pub cycler: CyclerConfig,
    /// Color the window is cleared with before the root draws.
    pub clear_color: Color,
}

impl HostConfig {
    pub fn with_cycler(mut self, cycler: CyclerConfig) -> Self {
        self.cycler = cycler;
        self
    }

    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        HostConfig {
            cycler: CyclerConfig::default(),
            clear_color: Color::WHITE,
        }
    }
}
