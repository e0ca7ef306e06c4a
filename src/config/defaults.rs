//! Default values of the application configuration
//!
//! Plugin thresholds come from the built-in plugin defaults; the values
//! here cover the refresh loop, the layout and the display knobs.

use std::collections::BTreeMap;
use sysglance_core::{PluginConfig, DEFAULT_REFRESH};

/// Current config format version
pub const CONFIG_VERSION: u32 = 1;

/// Interval between keyboard polls while waiting for the next refresh
pub const DEFAULT_POLL_SLICE_MS: u64 = 100;

/// Content width of the middle-left column
pub const DEFAULT_MIDDLE_LEFT_WIDTH: u16 = 34;

/// Panel that fills the remaining height of the middle-right column
pub const DEFAULT_FLEXIBLE_PANEL: &str = "processlist";

pub const DEFAULT_MAX_PROCESSES: usize = 10;

pub fn version() -> u32 {
    CONFIG_VERSION
}

pub fn refresh_secs() -> f64 {
    DEFAULT_REFRESH.as_secs_f64()
}

pub fn poll_slice_ms() -> u64 {
    DEFAULT_POLL_SLICE_MS
}

pub fn middle_left_width() -> u16 {
    DEFAULT_MIDDLE_LEFT_WIDTH
}

pub fn flexible_panel() -> String {
    DEFAULT_FLEXIBLE_PANEL.to_string()
}

pub fn max_processes() -> usize {
    DEFAULT_MAX_PROCESSES
}

pub fn timezone() -> String {
    "Local".to_string()
}

/// Configuration of every built-in plugin
pub fn plugins() -> BTreeMap<String, PluginConfig> {
    sysglance_sources::plugin_configs()
}
