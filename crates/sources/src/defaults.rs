//! Default alert thresholds of the built-in plugins

use std::collections::BTreeMap;
use sysglance_core::{PluginConfig, Thresholds};

/// Ids of every built-in plugin, in registration order
pub const PLUGIN_IDS: [&str; 6] = ["cpu", "percpu", "mem", "network", "alert", "now"];

/// Default configuration of one plugin
pub fn plugin_config(id: &str) -> PluginConfig {
    match id {
        "cpu" => PluginConfig::with_thresholds([
            ("total", Thresholds::new(65.0, 75.0, 85.0).logged()),
            ("user", Thresholds::new(50.0, 70.0, 90.0).logged()),
            ("system", Thresholds::new(50.0, 70.0, 90.0).logged()),
            ("iowait", Thresholds::new(30.0, 40.0, 50.0).logged()),
            ("steal", Thresholds::new(50.0, 70.0, 90.0)),
            ("ctx_switches", Thresholds::new(160_000.0, 180_000.0, 200_000.0)),
        ]),
        "percpu" => PluginConfig::with_thresholds([
            ("user", Thresholds::new(50.0, 70.0, 90.0)),
            ("system", Thresholds::new(50.0, 70.0, 90.0)),
            ("iowait", Thresholds::new(50.0, 70.0, 90.0)),
            ("steal", Thresholds::new(50.0, 70.0, 90.0)),
        ]),
        "mem" => PluginConfig::with_thresholds([("percent", Thresholds::new(50.0, 70.0, 90.0).logged())]),
        _ => PluginConfig::default(),
    }
}

/// Default configuration of every built-in plugin
pub fn plugin_configs() -> BTreeMap<String, PluginConfig> {
    PLUGIN_IDS
        .iter()
        .map(|id| (id.to_string(), plugin_config(id)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_plugin_has_defaults() {
        let configs = plugin_configs();
        assert_eq!(configs.len(), PLUGIN_IDS.len());
        assert!(configs.values().all(|c| c.enabled));
    }

    #[test]
    fn test_thresholds_ascend() {
        for config in plugin_configs().values() {
            for t in config.thresholds.values() {
                assert!(t.careful <= t.warning && t.warning <= t.critical);
            }
        }
    }

    #[test]
    fn test_cpu_total_is_logged() {
        let cpu = plugin_config("cpu");
        assert!(cpu.threshold("total").unwrap().log);
        assert!(!cpu.threshold("steal").unwrap().log);
        assert!(plugin_config("unknown").thresholds.is_empty());
    }
}
