//! Sampled plugin trait and its shared state

use crate::clock::SampleClock;
use crate::error::{FormatError, SampleError};
use crate::format;
use crate::history::{Trend, TrendHistory};
use log::{trace, warn};
use std::time::Instant;
use sysglance_types::{
    DisplayLine, FieldMetadata, FieldValue, PanelDescriptor, PluginConfig, Snapshot, ViewSet,
};

/// Metadata about a plugin
#[derive(Debug, Clone)]
pub struct PluginMetadata {
    /// Unique identifier, also the configuration key
    pub id: String,
    /// Title shown on the panel border
    pub title: String,
    /// Description of what this plugin shows
    pub description: String,
}

impl PluginMetadata {
    pub fn new(id: &str, title: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
        }
    }
}

/// Runtime knobs handed to formatters on every render
#[derive(Debug, Clone, PartialEq)]
pub struct FormatContext {
    /// Column budget of the zone the panel lives in
    pub max_width: Option<u16>,
    /// Per-core CPU view instead of the aggregate one
    pub percpu: bool,
    /// Maximum rows of the process list
    pub max_processes: usize,
}

impl FormatContext {
    pub fn with_max_width(&self, max_width: u16) -> Self {
        Self {
            max_width: Some(max_width),
            ..self.clone()
        }
    }
}

impl Default for FormatContext {
    fn default() -> Self {
        Self {
            max_width: None,
            percpu: false,
            max_processes: 10,
        }
    }
}

/// Output of the render contract
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatsDisplay {
    pub lines: Vec<DisplayLine>,
    pub display: bool,
}

impl StatsDisplay {
    pub fn hidden() -> Self {
        Self::default()
    }
}

/// Turns a decorated snapshot into display lines
pub trait DisplayFormatter {
    fn format(
        &self,
        snapshot: &Snapshot,
        views: &ViewSet,
        history: &TrendHistory,
        ctx: &FormatContext,
    ) -> Result<Vec<DisplayLine>, FormatError>;
}

/// Mutable state every plugin carries across cycles
#[derive(Debug, Clone)]
pub struct PluginState {
    pub config: PluginConfig,
    clock: SampleClock,
    snapshot: Snapshot,
    views: ViewSet,
    history: TrendHistory,
    /// Zero defaults for every key ever produced, so the key set never
    /// shrinks between samples
    known_keys: Snapshot,
}

impl PluginState {
    pub fn new(config: PluginConfig) -> Self {
        Self {
            config,
            clock: SampleClock::new(),
            snapshot: Snapshot::new(),
            views: ViewSet::new(),
            history: TrendHistory::default(),
            known_keys: Snapshot::new(),
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn views(&self) -> &ViewSet {
        &self.views
    }

    pub fn history(&self) -> &TrendHistory {
        &self.history
    }

    fn remember_keys(&mut self, snapshot: &Snapshot) {
        for (key, value) in snapshot.iter() {
            if !self.known_keys.contains_key(key) {
                let zero = match value {
                    FieldValue::Int(_) => FieldValue::Int(0),
                    FieldValue::Float(_) => FieldValue::Float(0.0),
                    FieldValue::Text(_) => FieldValue::Text(String::new()),
                };
                self.known_keys.insert(key, zero);
            }
        }
    }
}

/// A metric family sampled once per refresh cycle
///
/// Implementors provide `collect`, `decorate` and a formatter; the provided
/// methods take care of elapsed time, error recovery, key stability and
/// trend history.
pub trait SampledPlugin {
    fn metadata(&self) -> &PluginMetadata;

    /// Static description of the sampled fields
    fn fields(&self) -> Vec<FieldMetadata>;

    fn state(&self) -> &PluginState;

    fn state_mut(&mut self) -> &mut PluginState;

    /// One pass over the metric source. `elapsed` is the time since the
    /// previous pass, in seconds.
    fn collect(&mut self, elapsed: f64) -> Result<Snapshot, SampleError>;

    /// Snapshot used before the first sample and after a failed one
    fn init_snapshot(&self) -> Snapshot;

    fn decorate(&self, snapshot: &Snapshot) -> ViewSet;

    fn formatter(&self) -> &dyn DisplayFormatter;

    /// Fields pushed into the trend history each cycle
    fn tracked_fields(&self) -> &[&'static str] {
        &[]
    }

    /// Whether the panel takes part in the layout
    fn is_displayed(&self, _ctx: &FormatContext) -> bool {
        self.state().config.enabled && !self.snapshot().is_empty()
    }

    fn snapshot(&self) -> &Snapshot {
        self.state().snapshot()
    }

    fn views(&self) -> &ViewSet {
        self.state().views()
    }

    fn sample(&mut self) -> &Snapshot {
        self.sample_at(Instant::now())
    }

    /// Sample, decorate and record trends. Collection errors are logged and
    /// leave the init snapshot in place until the next cycle.
    fn sample_at(&mut self, now: Instant) -> &Snapshot {
        let elapsed = self.state().clock.elapsed(now);
        let mut snapshot = match self.collect(elapsed) {
            Ok(snapshot) => {
                let state = self.state_mut();
                state.clock.mark(now);
                state.remember_keys(&snapshot);
                snapshot
            }
            Err(e) => {
                warn!("{}: sampling failed, resetting: {}", self.metadata().id, e);
                self.init_snapshot()
            }
        };
        snapshot.fill_missing(&self.state().known_keys);
        snapshot.set_time_since_update(elapsed);
        trace!(
            "{}: sampled {} fields after {:.3}s",
            self.metadata().id,
            snapshot.len(),
            elapsed
        );

        let views = self.decorate(&snapshot);
        let tracked: Vec<(&'static str, f64)> = self
            .tracked_fields()
            .iter()
            .filter_map(|field| snapshot.get_f64(field).map(|v| (*field, v)))
            .collect();

        let state = self.state_mut();
        for (field, value) in tracked {
            state.history.push(field, value);
        }
        state.snapshot = snapshot;
        state.views = views;
        &state.snapshot
    }

    /// Replace the current snapshot with the init one
    fn reset(&mut self) {
        let snapshot = self.init_snapshot();
        let views = self.decorate(&snapshot);
        let state = self.state_mut();
        state.snapshot = snapshot;
        state.views = views;
    }

    fn trend(&self, field: &str) -> Trend {
        self.state().history.trend(field)
    }

    fn combined_trend(&self, a: &str, b: &str) -> Trend {
        self.state().history.combined(a, b)
    }

    /// Render contract consumed by the layout engine
    fn get_stats_display(&self, ctx: &FormatContext) -> Result<StatsDisplay, FormatError> {
        if !self.is_displayed(ctx) {
            return Ok(StatsDisplay::hidden());
        }
        let state = self.state();
        let lines = self
            .formatter()
            .format(&state.snapshot, &state.views, &state.history, ctx)?;
        format::validate(&lines)?;
        Ok(StatsDisplay {
            display: !lines.is_empty(),
            lines,
        })
    }

    /// Measured descriptor for this cycle
    fn describe(&self, ctx: &FormatContext) -> Result<PanelDescriptor, FormatError> {
        let meta = self.metadata();
        let stats = self.get_stats_display(ctx)?;
        Ok(format::describe(&meta.id, &meta.title, stats.lines, stats.display))
    }
}

/// Type-erased plugin for dynamic dispatch
pub type BoxedPlugin = Box<dyn SampledPlugin>;
