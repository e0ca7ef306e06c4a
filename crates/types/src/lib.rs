//! sysglance-types: Shared data types for the sysglance dashboard.
//!
//! This crate contains pure data types (snapshots, decorations, display
//! fragments, panel descriptors, plugin configs) shared across all
//! sysglance crates. Nothing here touches the terminal or the OS.

pub mod display;
pub mod field;
pub mod panel;
pub mod plugin_config;
pub mod snapshot;
pub mod view;

// Re-export commonly used types at the crate root for convenience
pub use display::{DisplayLine, DisplayStyle};
pub use field::{FieldMetadata, FieldUnit};
pub use panel::{PanelDescriptor, PANEL_BORDER_HEIGHT, PANEL_BORDER_WIDTH};
pub use plugin_config::PluginConfig;
pub use snapshot::{FieldValue, Snapshot, MIN_TIME_SINCE_UPDATE};
pub use view::{FieldView, Severity, Thresholds, ViewSet};
