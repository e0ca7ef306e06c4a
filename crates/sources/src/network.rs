//! Network interface plugin
//!
//! Per-interface byte counters turned into deltas and shown in bits per
//! second.

use crate::defaults::plugin_config;
use std::collections::HashMap;
use sysglance_core::format::{fit, LineBuilder};
use sysglance_core::{
    auto_unit, counter_delta, BoxedMetricSource, Decorator, DisplayFormatter, DisplayLine,
    FieldMetadata, FieldUnit, FieldValue, FormatContext, FormatError, PluginConfig,
    PluginMetadata, PluginState, SampleError, SampledPlugin, Snapshot, TrendHistory, ViewSet,
};

pub const NETWORK_ID: &str = "network";

/// Width used when the zone does not give one
const DEFAULT_MAX_WIDTH: u16 = 34;
/// Columns taken by the two rate columns
const RATE_COLUMNS: usize = 14;
/// Comma-separated names of the interfaces in the latest sample
const INTERFACES_KEY: &str = "interfaces";

fn interface_key(name: &str, counter: &str) -> String {
    format!("{}.{}", name, counter)
}

fn interfaces(snapshot: &Snapshot) -> Vec<&str> {
    snapshot
        .get(INTERFACES_KEY)
        .and_then(FieldValue::as_str)
        .map(|names| names.split(',').filter(|n| !n.is_empty()).collect())
        .unwrap_or_default()
}

/// Bit rate of a byte delta, e.g. `8.00Mb`
fn bit_rate(snapshot: &Snapshot, key: &str) -> String {
    let bits = snapshot.rate(key).map_or(0.0, |r| (r * 8.0).floor());
    format!("{}b", auto_unit(bits, None))
}

pub struct NetworkFormatter;

impl DisplayFormatter for NetworkFormatter {
    fn format(
        &self,
        snapshot: &Snapshot,
        _views: &ViewSet,
        _history: &TrendHistory,
        ctx: &FormatContext,
    ) -> Result<Vec<DisplayLine>, FormatError> {
        let names = interfaces(snapshot);
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let max_width = ctx.max_width.unwrap_or(DEFAULT_MAX_WIDTH) as usize;
        let name_width = max_width.saturating_sub(RATE_COLUMNS).max(4);

        let mut b = LineBuilder::new();
        b.title(fit("NETWORK", name_width));
        b.text(format!("{:>7}", "Rx/s"));
        b.text(format!("{:>7}", "Tx/s"));
        for name in names {
            b.newline();
            b.text(fit(name, name_width));
            b.text(format!("{:>7}", bit_rate(snapshot, &interface_key(name, "bytes_recv"))));
            b.text(format!("{:>7}", bit_rate(snapshot, &interface_key(name, "bytes_sent"))));
        }
        Ok(b.build())
    }
}

/// Network plugin
pub struct NetworkPlugin {
    metadata: PluginMetadata,
    state: PluginState,
    source: BoxedMetricSource,
    /// Raw (received, sent) counters per interface, `None` until the first sample
    previous: Option<HashMap<String, (u64, u64)>>,
    formatter: NetworkFormatter,
}

impl NetworkPlugin {
    pub fn new(source: BoxedMetricSource, config: PluginConfig) -> Self {
        Self {
            metadata: PluginMetadata::new(NETWORK_ID, "NETWORK", "Network interface bit rates"),
            state: PluginState::new(config),
            source,
            previous: None,
            formatter: NetworkFormatter,
        }
    }

    pub fn with_defaults(source: BoxedMetricSource) -> Self {
        Self::new(source, plugin_config(NETWORK_ID))
    }
}

impl SampledPlugin for NetworkPlugin {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    fn fields(&self) -> Vec<FieldMetadata> {
        vec![
            FieldMetadata::new(INTERFACES_KEY, "Interfaces in the latest sample", FieldUnit::Text),
            FieldMetadata::new("bytes_recv", "Bytes received since the last sample", FieldUnit::Byte)
                .rate()
                .short_name("Rx/s"),
            FieldMetadata::new("bytes_sent", "Bytes sent since the last sample", FieldUnit::Byte)
                .rate()
                .short_name("Tx/s"),
        ]
    }

    fn state(&self) -> &PluginState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PluginState {
        &mut self.state
    }

    fn collect(&mut self, _elapsed: f64) -> Result<Snapshot, SampleError> {
        let counters = self.source.networks()?;
        let mut snapshot = Snapshot::new();
        let mut current = HashMap::with_capacity(counters.len());
        for iface in &counters {
            let before = self.previous.as_ref().and_then(|p| p.get(&iface.name));
            snapshot.insert(
                interface_key(&iface.name, "bytes_recv"),
                counter_delta(before.map(|b| b.0), iface.bytes_recv),
            );
            snapshot.insert(
                interface_key(&iface.name, "bytes_sent"),
                counter_delta(before.map(|b| b.1), iface.bytes_sent),
            );
            current.insert(iface.name.clone(), (iface.bytes_recv, iface.bytes_sent));
        }
        let names: Vec<&str> = counters.iter().map(|c| c.name.as_str()).collect();
        snapshot.insert(INTERFACES_KEY, names.join(","));
        self.previous = Some(current);
        Ok(snapshot)
    }

    fn init_snapshot(&self) -> Snapshot {
        Snapshot::with_defaults([INTERFACES_KEY], FieldValue::Text(String::new()))
    }

    fn decorate(&self, snapshot: &Snapshot) -> ViewSet {
        Decorator::new(snapshot, &self.state.config, &self.fields()).finish()
    }

    fn formatter(&self) -> &dyn DisplayFormatter {
        &self.formatter
    }

    fn is_displayed(&self, _ctx: &FormatContext) -> bool {
        self.state.config.enabled && !interfaces(self.snapshot()).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::rendered;
    use std::time::{Duration, Instant};
    use sysglance_core::{MetricSource, NetworkCounters, SourceError};

    struct Counters {
        readings: Vec<Vec<(&'static str, u64, u64)>>,
    }

    impl MetricSource for Counters {
        fn networks(&mut self) -> Result<Vec<NetworkCounters>, SourceError> {
            if self.readings.is_empty() {
                return Err(SourceError::Unsupported("network"));
            }
            Ok(self
                .readings
                .remove(0)
                .into_iter()
                .map(|(name, rx, tx)| NetworkCounters {
                    name: name.to_string(),
                    bytes_recv: rx,
                    bytes_sent: tx,
                })
                .collect())
        }
    }

    fn plugin(readings: Vec<Vec<(&'static str, u64, u64)>>) -> NetworkPlugin {
        NetworkPlugin::with_defaults(Box::new(Counters { readings }))
    }

    #[test]
    fn test_first_sample_is_zero_then_delta() {
        let mut net = plugin(vec![
            vec![("eth0", 1000, 500)],
            vec![("eth0", 3000, 400), ("wlan0", 90, 10)],
        ]);
        let start = Instant::now();
        let first = net.sample_at(start);
        assert_eq!(first.get_i64("eth0.bytes_recv"), Some(0));

        let second = net.sample_at(start + Duration::from_secs(2));
        assert_eq!(second.get_i64("eth0.bytes_recv"), Some(2000));
        // A counter that went backwards is a new baseline
        assert_eq!(second.get_i64("eth0.bytes_sent"), Some(0));
        // A new interface has no history yet
        assert_eq!(second.get_i64("wlan0.bytes_recv"), Some(0));
    }

    #[test]
    fn test_rows_fit_zone_width() {
        let mut net = plugin(vec![
            vec![("enp0s31f6-very-long-name", 0, 0)],
            vec![("enp0s31f6-very-long-name", 262_144, 0)],
        ]);
        let start = Instant::now();
        net.sample_at(start);
        net.sample_at(start + Duration::from_secs(1));

        let ctx = FormatContext::default().with_max_width(34);
        let lines = net.get_stats_display(&ctx).unwrap().lines;
        let text = rendered(&lines);
        let rows: Vec<&str> = text.split('\n').collect();
        assert_eq!(rows[0], "NETWORK                Rx/s   Tx/s");
        assert_eq!(rows[1], "enp0s31f6-very-long- 2.00Mb     0b");
        assert!(rows.iter().all(|r| r.chars().count() <= 34));
    }

    #[test]
    fn test_hidden_without_interfaces() {
        let mut net = plugin(vec![vec![]]);
        net.sample_at(Instant::now());
        assert!(!net.get_stats_display(&FormatContext::default()).unwrap().display);
    }
}
