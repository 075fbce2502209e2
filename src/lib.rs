//! A retained render tree with box-model layout, a debounced layout/paint scheduler and a
//! window host that routes native input to controls.
//!
//! Build a tree of [`RenderObject`]s, hand it to a [`WindowHost`] together with a
//! [`NativeWindow`] and an [`EventLoop`], send native events through
//! [`WindowHost::event_sender`] and call [`WindowHost::poll`] regularly. The [`headless`] module
//! has in-memory implementations of every platform interface.

mod border;
mod canvas;
pub mod color;
mod config;
mod cycler;
mod error;
pub mod events;
mod flex;
pub mod graphics;
pub mod headless;
mod host;
pub mod platform;
mod rect;
mod render_object;
mod scroll;
pub mod shape;
mod size;
mod stack;
mod text;
mod window;

pub use border::{BorderRenderObject, BorderStyle};
pub use canvas::{CanvasRenderObject, PaintHandler};
pub use color::Color;
pub use config::{CyclerConfig, HostConfig, RedrawPolicy};
pub use cycler::{CycleOutcome, CycleStats, CycleTarget, Invalidator, LayoutPaintCycler};
pub use error::{HostError, PlatformError, TreeError};
pub use flex::{
    FlexChildLayoutData, FlexCrossAlignment, FlexDirection, FlexLayout, FlexMainAlignment,
};
pub use graphics::{Brush, Font, GraphicsFactory, Painter, TextLayout, TransformGuard};
pub use host::{AfterLayoutAction, HostEvent, WindowHost};
pub use platform::{EventLoop, ManualEventLoop, NativeEvent, NativeWindow, TimerHandle};
pub use rect::{translation, Matrix, Point, Rect, Vector};
pub use render_object::{
    default_hit_test, draw_child, draw_children, hit_test_children, ChildMode, ControlId, Frame,
    Hit, RenderKind, RenderObject, RenderObjectId,
};
pub use scroll::ScrollRenderObject;
pub use size::{is_infinite_length, Size, Thickness, INFINITE_LENGTH};
pub use stack::{anchor, Alignment, StackChildLayoutData, StackLayout};
pub use text::TextRenderObject;
pub use window::WindowRenderObject;
