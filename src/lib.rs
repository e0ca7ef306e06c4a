//! sysglance: a live-refresh terminal system dashboard
//!
//! This library provides the application side of sysglance:
//! - Configuration loading and defaults
//! - Per-cycle sampling of the registered plugins
//! - The zone layout engine and its ratatui rendering
//! - The refresh scheduler and keyboard handling

pub mod config;
pub mod core;

// Re-export commonly used types
pub use config::AppConfig;
pub use core::{LayoutEngine, RefreshScheduler, Stats};
