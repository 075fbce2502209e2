//! Error types.

use crate::render_object::ChildMode;
use thiserror::Error;

/// Misuse of the render tree's child list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("child position {position} is out of range for {len} children")]
    ChildPositionOutOfRange { position: usize, len: usize },

    #[error("{name} cannot take another child (child mode {mode:?})")]
    ChildModeViolation { name: String, mode: ChildMode },
}

/// Errors reported by the native platform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("native painter unavailable: {0}")]
    PainterUnavailable(String),

    #[error("native window has been destroyed")]
    WindowDestroyed,
}

/// Errors surfaced by a window host while running a layout/paint cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("a layout/paint cycle panicked: {0}")]
    CyclePanicked(String),
}
