//! Clock plugin shown in the bottom zone

use crate::defaults::plugin_config;
use chrono::{DateTime, Local, Utc};
use chrono_tz::Tz;
use sysglance_core::format::LineBuilder;
use sysglance_core::{
    Decorator, DisplayFormatter, DisplayLine, FieldMetadata, FieldUnit, FieldValue, FormatContext,
    FormatError, PluginConfig, PluginMetadata, PluginState, SampleError, SampledPlugin, Snapshot,
    TrendHistory, ViewSet,
};

pub const NOW_ID: &str = "now";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// Source of the current time
pub type TimeSource = Box<dyn Fn() -> DateTime<Utc>>;

pub struct NowFormatter;

impl DisplayFormatter for NowFormatter {
    fn format(
        &self,
        snapshot: &Snapshot,
        _views: &ViewSet,
        _history: &TrendHistory,
        _ctx: &FormatContext,
    ) -> Result<Vec<DisplayLine>, FormatError> {
        let now = snapshot
            .get("now")
            .and_then(FieldValue::as_str)
            .ok_or_else(|| FormatError::MissingField("now".to_string()))?;
        let mut b = LineBuilder::new();
        if !now.is_empty() {
            b.text(now);
        }
        Ok(b.build())
    }
}

/// Current date and time
pub struct NowPlugin {
    metadata: PluginMetadata,
    state: PluginState,
    /// `None` for the local timezone
    timezone: Option<Tz>,
    clock: TimeSource,
    formatter: NowFormatter,
}

impl NowPlugin {
    /// `timezone` is "Local" or an IANA name such as "Europe/London"
    pub fn new(config: PluginConfig, timezone: &str) -> Self {
        let timezone = if timezone == "Local" {
            None
        } else {
            match timezone.parse::<Tz>() {
                Ok(tz) => Some(tz),
                Err(e) => {
                    log::warn!("Unknown timezone {:?}, using local time: {}", timezone, e);
                    None
                }
            }
        };
        Self {
            metadata: PluginMetadata::new(NOW_ID, "NOW", "Current date and time"),
            state: PluginState::new(config),
            timezone,
            clock: Box::new(Utc::now),
            formatter: NowFormatter,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(plugin_config(NOW_ID), "Local")
    }

    pub fn with_clock(mut self, clock: TimeSource) -> Self {
        self.clock = clock;
        self
    }

    fn format_time(&self, now: DateTime<Utc>) -> String {
        match self.timezone {
            Some(tz) => now.with_timezone(&tz).format(TIME_FORMAT).to_string(),
            None => now.with_timezone(&Local).format(TIME_FORMAT).to_string(),
        }
    }
}

impl SampledPlugin for NowPlugin {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    fn fields(&self) -> Vec<FieldMetadata> {
        vec![FieldMetadata::new("now", "Current date and time", FieldUnit::Text)]
    }

    fn state(&self) -> &PluginState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PluginState {
        &mut self.state
    }

    fn collect(&mut self, _elapsed: f64) -> Result<Snapshot, SampleError> {
        let mut snapshot = Snapshot::new();
        snapshot.insert("now", self.format_time((self.clock)()));
        Ok(snapshot)
    }

    fn init_snapshot(&self) -> Snapshot {
        Snapshot::with_defaults(["now"], FieldValue::Text(String::new()))
    }

    fn decorate(&self, snapshot: &Snapshot) -> ViewSet {
        Decorator::new(snapshot, &self.state.config, &self.fields()).finish()
    }

    fn formatter(&self) -> &dyn DisplayFormatter {
        &self.formatter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Instant;

    fn fixed() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap()
    }

    #[test]
    fn test_named_timezone() {
        let mut now = NowPlugin::new(PluginConfig::default(), "Europe/Paris").with_clock(Box::new(fixed));
        now.sample_at(Instant::now());
        assert_eq!(
            now.snapshot().get("now").and_then(FieldValue::as_str),
            Some("2024-03-01 13:30:05 CET")
        );
        let descriptor = now.describe(&FormatContext::default()).unwrap();
        assert_eq!(descriptor.height, 3);
    }

    #[test]
    fn test_unknown_timezone_falls_back_to_local() {
        let now = NowPlugin::new(PluginConfig::default(), "Mars/Olympus");
        assert!(now.timezone.is_none());
    }

    #[test]
    fn test_utc_timezone() {
        let mut now = NowPlugin::new(PluginConfig::default(), "UTC").with_clock(Box::new(fixed));
        now.sample_at(Instant::now());
        let stats = now.get_stats_display(&FormatContext::default()).unwrap();
        assert_eq!(stats.lines.len(), 1);
        assert_eq!(stats.lines[0].as_text(), "2024-03-01 12:30:05 UTC");
    }
}
