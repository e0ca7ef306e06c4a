//! Refresh loop, layout and terminal plumbing of the dashboard

mod keyboard;
mod layout;
mod render;
mod scheduler;
mod stats;

pub use keyboard::{decode, CrosstermKeys};
pub use layout::{
    CyclePhase, LayoutEngine, LayoutNode, LayoutSettings, LayoutTree, NodeKind, Size, Split,
    MIDDLE_LEFT_BORDER,
};
pub use render::{draw_tree, RenderSurface, TerminalSurface};
pub use scheduler::{
    cadence_fault, effective_duration, Countdown, CycleClock, KeyAction, KeySource, RefreshScheduler,
    SystemClock, MIN_CYCLE_SECS,
};
pub use stats::Stats;
