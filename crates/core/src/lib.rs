//! sysglance-core: Sampling pipeline and plugin registry for sysglance.
//!
//! This crate contains the `SampledPlugin` trait, the `MetricSource` and
//! remote input boundaries, alert classification, trend history and the
//! measurement helpers the layout engine relies on.

pub mod alert;
pub mod clock;
pub mod constants;
pub mod counters;
mod error;
pub mod events;
pub mod format;
pub mod history;
pub mod metric_source;
mod plugin;
mod registry;
pub mod remote;

pub use alert::Decorator;
pub use clock::SampleClock;
pub use constants::{DEFAULT_REFRESH, MAX_EVENTS, TREND_SIGNIFICANT, TREND_WINDOW};
pub use counters::counter_delta;
pub use error::{FormatError, SampleError, SourceError};
pub use events::{AlertEvent, EventLog};
pub use format::{auto_unit, LineBuilder};
pub use history::{Trend, TrendHistory};
pub use metric_source::{
    BoxedMetricSource, CoreSample, CpuCounters, CpuSample, CpuTimesPercent, MemorySample,
    MetricSource, NetworkCounters,
};
pub use plugin::{
    BoxedPlugin, DisplayFormatter, FormatContext, PluginMetadata, PluginState, SampledPlugin,
    StatsDisplay,
};
pub use registry::{PluginRegistry, Zone};
pub use remote::{InputMethod, RemoteSystem, ScalarSource};

// Re-export types used in trait signatures for convenience
pub use sysglance_types::{
    DisplayLine, DisplayStyle, FieldMetadata, FieldUnit, FieldValue, FieldView, PanelDescriptor,
    PluginConfig, Severity, Snapshot, Thresholds, ViewSet,
};
