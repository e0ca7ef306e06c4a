//! Memory plugin

use crate::defaults::plugin_config;
use sysglance_core::format::LineBuilder;
use sysglance_core::remote::parse_scalar;
use sysglance_core::{
    auto_unit, Decorator, DisplayFormatter, DisplayLine, FieldMetadata, FieldUnit, FieldValue,
    FormatContext, FormatError, InputMethod, MetricSource, PluginConfig, PluginMetadata,
    PluginState, RemoteSystem, SampleError, SampledPlugin, ScalarSource, Snapshot, TrendHistory,
    ViewSet,
};

pub const MEM_ID: &str = "mem";

const SNMP_DEFAULT: [(&str, &str); 5] = [
    ("total", "1.3.6.1.4.1.2021.4.5.0"),
    ("free", "1.3.6.1.4.1.2021.4.11.0"),
    ("shared", "1.3.6.1.4.1.2021.4.13.0"),
    ("buffers", "1.3.6.1.4.1.2021.4.14.0"),
    ("cached", "1.3.6.1.4.1.2021.4.15.0"),
];
const SNMP_STORAGE: [(&str, &str); 4] = [
    ("mnt_point", "1.3.6.1.2.1.25.2.3.1.3"),
    ("alloc_unit", "1.3.6.1.2.1.25.2.3.1.4"),
    ("size", "1.3.6.1.2.1.25.2.3.1.5"),
    ("used", "1.3.6.1.2.1.25.2.3.1.6"),
];
/// Storage table rows that describe physical RAM
const RAM_ROWS: [&str; 2] = ["Physical Memory", "Real Memory"];

pub struct MemFormatter;

impl MemFormatter {
    fn stat(b: &mut LineBuilder, snapshot: &Snapshot, views: &ViewSet, key: &str, header: &str) {
        if let Some(value) = snapshot.get_f64(key) {
            let optional = views.is_optional(key);
            b.text_opt(format!("{}{:9}", header, format!("{}:", key)), optional);
            b.value(format!("{:>7}", auto_unit(value, None)), views.get(key));
        }
    }
}

impl DisplayFormatter for MemFormatter {
    fn format(
        &self,
        snapshot: &Snapshot,
        views: &ViewSet,
        history: &TrendHistory,
        _ctx: &FormatContext,
    ) -> Result<Vec<DisplayLine>, FormatError> {
        let percent = snapshot
            .get_f64("percent")
            .ok_or_else(|| FormatError::MissingField("percent".to_string()))?;
        let mut b = LineBuilder::new();

        b.title("MEM");
        b.text(format!(" {:2}", history.trend("percent").glyph()));
        b.value(format!("{:>6.1}%", percent), views.get("percent"));
        Self::stat(&mut b, snapshot, views, "active", "    ");

        for (left, right) in [("total", "inactive"), ("used", "buffers"), ("free", "cached")] {
            b.newline();
            Self::stat(&mut b, snapshot, views, left, "");
            Self::stat(&mut b, snapshot, views, right, "  ");
        }
        Ok(b.build())
    }
}

/// Memory plugin
pub struct MemPlugin {
    metadata: PluginMetadata,
    state: PluginState,
    input: InputMethod,
    formatter: MemFormatter,
}

impl MemPlugin {
    pub fn new(input: InputMethod, config: PluginConfig) -> Self {
        Self {
            metadata: PluginMetadata::new(MEM_ID, "MEM", "Virtual memory usage"),
            state: PluginState::new(config),
            input,
            formatter: MemFormatter,
        }
    }

    pub fn with_defaults(input: InputMethod) -> Self {
        Self::new(input, plugin_config(MEM_ID))
    }

    fn collect_local(source: &mut dyn MetricSource) -> Result<Snapshot, SampleError> {
        let sample = source.memory()?;
        let mut snapshot = Snapshot::new();
        snapshot.insert("total", sample.total);
        snapshot.insert("available", sample.available);
        snapshot.insert("percent", sample.percent());
        let optional = [
            ("active", sample.active),
            ("inactive", sample.inactive),
            ("buffers", sample.buffers),
            ("cached", sample.cached),
            ("wired", sample.wired),
            ("shared", sample.shared),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                snapshot.insert(key, value);
            }
        }
        // htop-style accounting: reclaimable memory counts as free
        let free = sample.available + sample.buffers.unwrap_or(0) + sample.cached.unwrap_or(0);
        let free = free.min(sample.total);
        snapshot.insert("free", free);
        snapshot.insert("used", sample.total - free);
        Ok(snapshot)
    }

    fn collect_remote(source: &mut dyn ScalarSource) -> Result<Snapshot, SampleError> {
        let mut snapshot = Snapshot::new();
        match source.system_kind() {
            RemoteSystem::Windows | RemoteSystem::Esxi => {
                let table = source.get_bulk(&SNMP_STORAGE)?;
                let row = table
                    .iter()
                    .filter(|(key, value)| {
                        key.starts_with("mnt_point.") && RAM_ROWS.contains(&value.as_str())
                    })
                    .find_map(|(key, _)| key.strip_prefix("mnt_point."))
                    .ok_or_else(|| SampleError::RemoteUnavailable("Physical Memory".to_string()))?;
                let cell = |column: &str| {
                    parse_scalar(&table, &format!("{}.{}", column, row))
                        .ok_or_else(|| SampleError::RemoteUnavailable(column.to_string()))
                };
                let unit = cell("alloc_unit")?;
                let total = cell("size")? * unit;
                let used = cell("used")? * unit;
                snapshot.insert("total", total as u64);
                snapshot.insert("used", used as u64);
                snapshot.insert("free", (total - used).max(0.0) as u64);
                snapshot.insert("percent", if total > 0.0 { used * 100.0 / total } else { 0.0 });
            }
            _ => {
                let answers = source.get(&SNMP_DEFAULT)?;
                let total = parse_scalar(&answers, "total")
                    .ok_or_else(|| SampleError::RemoteUnavailable("total".to_string()))?
                    * 1024.0;
                let mut kib = |key: &str| {
                    let value = parse_scalar(&answers, key).map(|v| v * 1024.0);
                    if let Some(value) = value {
                        snapshot.insert(key, value as u64);
                    }
                    value.unwrap_or(0.0)
                };
                kib("shared");
                let buffers = kib("buffers");
                let cached = kib("cached");
                let free = (total - (buffers + cached)).max(0.0);
                let used = total - free;
                snapshot.insert("total", total as u64);
                snapshot.insert("free", free as u64);
                snapshot.insert("used", used as u64);
                snapshot.insert("percent", if total > 0.0 { used * 100.0 / total } else { 0.0 });
            }
        }
        Ok(snapshot)
    }
}

impl SampledPlugin for MemPlugin {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    fn fields(&self) -> Vec<FieldMetadata> {
        vec![
            FieldMetadata::new("total", "Total physical memory", FieldUnit::Byte),
            FieldMetadata::new("available", "Memory available without swapping", FieldUnit::Byte),
            FieldMetadata::new("percent", "Usage computed as (total - available) / total", FieldUnit::Percent),
            FieldMetadata::new("used", "Memory in use (total - free)", FieldUnit::Byte),
            FieldMetadata::new("free", "Available plus buffers and cache", FieldUnit::Byte),
            FieldMetadata::new("active", "Recently used memory", FieldUnit::Byte).optional(),
            FieldMetadata::new("inactive", "Memory not recently used", FieldUnit::Byte).optional(),
            FieldMetadata::new("buffers", "File system metadata cache", FieldUnit::Byte).optional(),
            FieldMetadata::new("cached", "Page cache", FieldUnit::Byte).optional(),
            FieldMetadata::new("wired", "Memory that is never swapped", FieldUnit::Byte),
            FieldMetadata::new("shared", "Memory shared between processes", FieldUnit::Byte),
        ]
    }

    fn state(&self) -> &PluginState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PluginState {
        &mut self.state
    }

    fn collect(&mut self, _elapsed: f64) -> Result<Snapshot, SampleError> {
        match &mut self.input {
            InputMethod::Local(source) => Self::collect_local(source.as_mut()),
            InputMethod::Remote(source) => Self::collect_remote(source.as_mut()),
        }
    }

    fn init_snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::with_defaults(["total", "used", "free"], FieldValue::Int(0));
        snapshot.insert("percent", 0.0);
        snapshot
    }

    fn decorate(&self, snapshot: &Snapshot) -> ViewSet {
        Decorator::new(snapshot, &self.state.config, &self.fields())
            .alert("percent")
            .finish()
    }

    fn formatter(&self) -> &dyn DisplayFormatter {
        &self.formatter
    }

    fn tracked_fields(&self) -> &[&'static str] {
        &["percent"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{answers, rendered, ScriptedAgent};
    use std::time::Instant;
    use sysglance_core::{MemorySample, Severity, SourceError};

    const GIB: u64 = 1024 * 1024 * 1024;

    struct FixedMemory;

    impl MetricSource for FixedMemory {
        fn memory(&mut self) -> Result<MemorySample, SourceError> {
            Ok(MemorySample {
                total: 8 * GIB,
                available: 2 * GIB,
                used: 5 * GIB,
                free: GIB,
                active: Some(3 * GIB),
                buffers: Some(GIB / 2),
                cached: Some(GIB / 2),
                ..MemorySample::default()
            })
        }
    }

    #[test]
    fn test_free_includes_reclaimable_memory() {
        let mut mem = MemPlugin::with_defaults(InputMethod::Local(Box::new(FixedMemory)));
        let snapshot = mem.sample_at(Instant::now());
        assert_eq!(snapshot.get_i64("free"), Some(3 * GIB as i64));
        assert_eq!(snapshot.get_i64("used"), Some(5 * GIB as i64));
        assert_eq!(snapshot.get_f64("percent"), Some(75.0));
        assert_eq!(mem.views().severity("percent"), Severity::Warning);
        assert!(mem.views().get("percent").unwrap().logged);
        assert!(mem.views().is_optional("buffers"));
    }

    #[test]
    fn test_panel_rows() {
        let mut mem = MemPlugin::with_defaults(InputMethod::Local(Box::new(FixedMemory)));
        mem.sample_at(Instant::now());
        let lines = mem.get_stats_display(&FormatContext::default()).unwrap().lines;
        let text = rendered(&lines);
        let rows: Vec<&str> = text.split('\n').collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], "MEM     75.0%    active:    3.00G");
        assert_eq!(rows[1], "total:     8.00G");
        assert_eq!(rows[3], "free:      3.00G  cached:     512M");
    }

    #[test]
    fn test_remote_default_scales_kib() {
        let agent = ScriptedAgent {
            kind: RemoteSystem::Default,
            replies: vec![answers([
                ("total", "1000"),
                ("free", "100"),
                ("shared", ""),
                ("buffers", "100"),
                ("cached", "300"),
            ])],
        };
        let mut mem = MemPlugin::with_defaults(InputMethod::Remote(Box::new(agent)));
        let snapshot = mem.sample_at(Instant::now());
        assert_eq!(snapshot.get_i64("total"), Some(1_024_000));
        assert_eq!(snapshot.get_i64("free"), Some(600 * 1024));
        assert_eq!(snapshot.get_f64("percent"), Some(40.0));
    }

    #[test]
    fn test_remote_windows_storage_table() {
        let agent = ScriptedAgent {
            kind: RemoteSystem::Windows,
            replies: vec![answers([
                ("mnt_point.1", "C:\\"),
                ("mnt_point.4", "Physical Memory"),
                ("alloc_unit.4", "65536"),
                ("size.4", "1000"),
                ("used.4", "250"),
            ])],
        };
        let mut mem = MemPlugin::with_defaults(InputMethod::Remote(Box::new(agent)));
        let snapshot = mem.sample_at(Instant::now());
        assert_eq!(snapshot.get_i64("total"), Some(65_536_000));
        assert_eq!(snapshot.get_f64("percent"), Some(25.0));
    }

    #[test]
    fn test_remote_missing_total_resets() {
        let agent = ScriptedAgent {
            kind: RemoteSystem::Default,
            replies: vec![answers([("total", "")])],
        };
        let mut mem = MemPlugin::with_defaults(InputMethod::Remote(Box::new(agent)));
        let snapshot = mem.sample_at(Instant::now());
        assert_eq!(snapshot.get_i64("total"), Some(0));
        assert_eq!(snapshot.get_f64("percent"), Some(0.0));
    }
}
