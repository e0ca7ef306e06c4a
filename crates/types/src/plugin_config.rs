//! Per-plugin configuration types

use crate::view::Thresholds;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_enabled() -> bool {
    true
}

/// Static configuration read once when a plugin is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Alert thresholds keyed by field name
    #[serde(default)]
    pub thresholds: BTreeMap<String, Thresholds>,
}

impl PluginConfig {
    pub fn with_thresholds<'a>(entries: impl IntoIterator<Item = (&'a str, Thresholds)>) -> Self {
        Self {
            enabled: true,
            thresholds: entries
                .into_iter()
                .map(|(field, t)| (field.to_string(), t))
                .collect(),
        }
    }

    pub fn threshold(&self, field: &str) -> Option<&Thresholds> {
        self.thresholds.get(field)
    }

    /// Overlay user-provided values on top of `self`
    pub fn merge(&mut self, other: &PluginConfig) {
        self.enabled = other.enabled;
        for (field, t) in &other.thresholds {
            self.thresholds.insert(field.clone(), *t);
        }
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            thresholds: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_enabled_defaults_true() {
        let config: PluginConfig = serde_json::from_str(r#"{"thresholds":{}}"#).unwrap();
        assert!(config.enabled);
    }

    #[test]
    fn test_merge_overrides_fields() {
        let mut base = PluginConfig::with_thresholds([
            ("user", Thresholds::new(50.0, 70.0, 90.0)),
            ("system", Thresholds::new(50.0, 70.0, 90.0)),
        ]);
        let user = PluginConfig {
            enabled: false,
            thresholds: [("user".to_string(), Thresholds::new(10.0, 20.0, 30.0))]
                .into_iter()
                .collect(),
        };
        base.merge(&user);

        assert!(!base.enabled);
        assert_eq!(base.threshold("user").map(|t| t.careful), Some(10.0));
        assert_eq!(base.threshold("system").map(|t| t.careful), Some(50.0));
    }
}
