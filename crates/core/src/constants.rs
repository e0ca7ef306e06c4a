//! Shared constants for the metric pipeline

use std::time::Duration;

/// Number of points kept per tracked field for trend detection
pub const TREND_WINDOW: usize = 6;

/// Minimum change across the trend window before a trend is reported.
/// Smaller movements are shown as flat to avoid flicker.
pub const TREND_SIGNIFICANT: f64 = 1.0;

/// Elapsed time reported by a plugin's first sample, in seconds
pub const FIRST_SAMPLE_ELAPSED: f64 = 1.0;

/// Maximum number of alert events kept in the event log
pub const MAX_EVENTS: usize = 10;

/// Default refresh interval of the dashboard
pub const DEFAULT_REFRESH: Duration = Duration::from_secs(2);
