//! Per-core CPU plugin, shown instead of the CPU panel in per-CPU mode

use crate::defaults::plugin_config;
use sysglance_core::format::LineBuilder;
use sysglance_core::{
    BoxedMetricSource, Decorator, DisplayFormatter, DisplayLine, FieldMetadata, FieldUnit,
    FieldValue, FormatContext, FormatError, PluginConfig, PluginMetadata, PluginState,
    SampleError, SampledPlugin, Snapshot, TrendHistory, ViewSet,
};

pub const PERCPU_ID: &str = "percpu";

/// Columns shown for every core, when the platform reports them
const COLUMNS: [&str; 5] = ["user", "system", "idle", "iowait", "steal"];

/// Columns that carry alert thresholds
const ALERT_COLUMNS: [&str; 4] = ["user", "system", "iowait", "steal"];

fn core_key(core: usize, stat: &str) -> String {
    format!("cpu{}.{}", core, stat)
}

fn core_count(snapshot: &Snapshot) -> usize {
    snapshot.get_i64("cpucore").unwrap_or(0).max(0) as usize
}

pub struct PerCpuFormatter;

impl DisplayFormatter for PerCpuFormatter {
    fn format(
        &self,
        snapshot: &Snapshot,
        views: &ViewSet,
        _history: &TrendHistory,
        _ctx: &FormatContext,
    ) -> Result<Vec<DisplayLine>, FormatError> {
        let cores = core_count(snapshot);
        if cores == 0 {
            return Ok(Vec::new());
        }
        let columns: Vec<&str> = COLUMNS
            .iter()
            .copied()
            .filter(|stat| snapshot.contains_key(&core_key(0, stat)))
            .collect();

        let mut b = LineBuilder::new();
        b.title(format!("{:7}", "PER CPU"));
        for stat in &columns {
            b.text(format!("{:>7}", stat));
        }
        for core in 0..cores {
            b.newline();
            match snapshot.get_f64(&core_key(core, "total")) {
                Some(total) => b.text(format!("{:6.1}%", total)),
                None => b.text(format!("{:>6}%", "?")),
            };
            for stat in &columns {
                let key = core_key(core, stat);
                match snapshot.get_f64(&key) {
                    Some(value) => b.value(format!("{:6.1}%", value), views.get(&key)),
                    None => b.text(format!("{:>6}%", "?")),
                };
            }
        }
        Ok(b.build())
    }
}

/// Per-core CPU plugin
pub struct PerCpuPlugin {
    metadata: PluginMetadata,
    state: PluginState,
    source: BoxedMetricSource,
    formatter: PerCpuFormatter,
}

impl PerCpuPlugin {
    pub fn new(source: BoxedMetricSource, config: PluginConfig) -> Self {
        Self {
            metadata: PluginMetadata::new(PERCPU_ID, "PER CPU", "CPU usage of every logical core"),
            state: PluginState::new(config),
            source,
            formatter: PerCpuFormatter,
        }
    }

    pub fn with_defaults(source: BoxedMetricSource) -> Self {
        Self::new(source, plugin_config(PERCPU_ID))
    }
}

impl SampledPlugin for PerCpuPlugin {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    fn fields(&self) -> Vec<FieldMetadata> {
        let mut fields = vec![
            FieldMetadata::new("cpucore", "Number of logical cores", FieldUnit::Number),
            FieldMetadata::new("total", "Core usage except idle", FieldUnit::Percent),
        ];
        fields.extend(
            COLUMNS
                .iter()
                .map(|stat| FieldMetadata::new(*stat, format!("Core {} time", stat), FieldUnit::Percent)),
        );
        fields
    }

    fn state(&self) -> &PluginState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PluginState {
        &mut self.state
    }

    fn collect(&mut self, _elapsed: f64) -> Result<Snapshot, SampleError> {
        let cores = self.source.per_cpu()?;
        let mut snapshot = Snapshot::new();
        for (index, core) in cores.iter().enumerate() {
            snapshot.insert(core_key(index, "total"), core.total);
            for (stat, value) in core.times.fields() {
                if let Some(value) = value {
                    snapshot.insert(core_key(index, stat), value);
                }
            }
        }
        snapshot.insert("cpucore", cores.len());
        Ok(snapshot)
    }

    fn init_snapshot(&self) -> Snapshot {
        Snapshot::with_defaults(["cpucore"], FieldValue::Int(0))
    }

    fn decorate(&self, snapshot: &Snapshot) -> ViewSet {
        let mut decorator = Decorator::new(snapshot, &self.state.config, &[]);
        for core in 0..core_count(snapshot) {
            for stat in ALERT_COLUMNS {
                decorator = decorator.alert_as(&core_key(core, stat), stat, 100.0);
            }
        }
        decorator.finish()
    }

    fn formatter(&self) -> &dyn DisplayFormatter {
        &self.formatter
    }

    fn is_displayed(&self, ctx: &FormatContext) -> bool {
        self.state.config.enabled && ctx.percpu && core_count(self.snapshot()) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::rendered;
    use std::time::Instant;
    use sysglance_core::{CoreSample, CpuTimesPercent, MetricSource, Severity, SourceError};

    struct TwoCores;

    impl MetricSource for TwoCores {
        fn per_cpu(&mut self) -> Result<Vec<CoreSample>, SourceError> {
            let core = |user: f64| CoreSample {
                total: user + 5.0,
                times: CpuTimesPercent {
                    user: Some(user),
                    system: Some(5.0),
                    idle: Some(95.0 - user),
                    ..CpuTimesPercent::default()
                },
            };
            Ok(vec![core(10.0), core(80.0)])
        }
    }

    fn percpu_ctx() -> FormatContext {
        FormatContext {
            percpu: true,
            ..FormatContext::default()
        }
    }

    #[test]
    fn test_per_core_rows() {
        let mut plugin = PerCpuPlugin::with_defaults(Box::new(TwoCores));
        plugin.sample_at(Instant::now());

        let stats = plugin.get_stats_display(&percpu_ctx()).unwrap();
        assert!(stats.display);
        let text = rendered(&stats.lines);
        let rows: Vec<&str> = text.split('\n').collect();
        assert_eq!(rows[0], "PER CPU   user system   idle");
        assert_eq!(rows[1], "  15.0%  10.0%   5.0%  85.0%");
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_core_values_use_column_thresholds() {
        let mut plugin = PerCpuPlugin::with_defaults(Box::new(TwoCores));
        plugin.sample_at(Instant::now());
        assert_eq!(plugin.views().severity("cpu0.user"), Severity::Ok);
        assert_eq!(plugin.views().severity("cpu1.user"), Severity::Warning);
        assert_eq!(plugin.views().severity("cpu1.idle"), Severity::None);
    }

    #[test]
    fn test_hidden_outside_percpu_mode() {
        let mut plugin = PerCpuPlugin::with_defaults(Box::new(TwoCores));
        plugin.sample_at(Instant::now());
        assert!(!plugin.get_stats_display(&FormatContext::default()).unwrap().display);
    }
}
