//! One cycle's computed metric values for a plugin

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Smallest elapsed time stored in a snapshot, in seconds.
///
/// Rates are computed as `delta / time_since_update`, so the divisor is
/// never allowed to reach zero.
pub const MIN_TIME_SINCE_UPDATE: f64 = 0.001;

/// A single sampled value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric view of the value, `None` for text
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            FieldValue::Float(v) => Some(*v as i64),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<usize> for FieldValue {
    fn from(value: usize) -> Self {
        FieldValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

/// Values produced by one sampling pass of a plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    values: BTreeMap<String, FieldValue>,
    time_since_update: f64,
}

impl Snapshot {
    /// Empty snapshot with a one second divisor
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
            time_since_update: 1.0,
        }
    }

    /// Build a snapshot where every key holds the same default value
    pub fn with_defaults<'a>(keys: impl IntoIterator<Item = &'a str>, default: FieldValue) -> Self {
        let mut snapshot = Self::new();
        for key in keys {
            snapshot.insert(key, default.clone());
        }
        snapshot
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.values.get(key).and_then(FieldValue::as_f64)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(FieldValue::as_i64)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.values.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Seconds since the previous sample, always strictly positive
    pub fn time_since_update(&self) -> f64 {
        self.time_since_update
    }

    /// Store the elapsed time, flooring non-positive or non-finite input
    pub fn set_time_since_update(&mut self, seconds: f64) {
        self.time_since_update = if seconds.is_finite() && seconds > MIN_TIME_SINCE_UPDATE {
            seconds
        } else {
            MIN_TIME_SINCE_UPDATE
        };
    }

    /// Per-second rate of a delta field
    pub fn rate(&self, key: &str) -> Option<f64> {
        self.get_f64(key).map(|delta| delta / self.time_since_update)
    }

    /// Copy every key missing from `self` out of `defaults`
    pub fn fill_missing(&mut self, defaults: &Snapshot) {
        for (key, value) in defaults.iter() {
            if !self.values.contains_key(key) {
                self.values.insert(key.to_string(), value.clone());
            }
        }
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_since_update_never_zero() {
        let mut snapshot = Snapshot::new();
        snapshot.set_time_since_update(0.0);
        assert!(snapshot.time_since_update() > 0.0);

        snapshot.set_time_since_update(-3.0);
        assert!(snapshot.time_since_update() > 0.0);

        snapshot.set_time_since_update(f64::NAN);
        assert!(snapshot.time_since_update() > 0.0);

        snapshot.set_time_since_update(2.0);
        assert_eq!(snapshot.time_since_update(), 2.0);
    }

    #[test]
    fn test_rate_divides_by_elapsed() {
        let mut snapshot = Snapshot::new();
        snapshot.insert("ctx_switches", 65u64);
        snapshot.set_time_since_update(2.0);
        assert_eq!(snapshot.rate("ctx_switches"), Some(32.5));
        assert_eq!(snapshot.rate("missing"), None);
    }

    #[test]
    fn test_fill_missing_keeps_existing_values() {
        let defaults = Snapshot::with_defaults(["total", "user"], FieldValue::Float(0.0));
        let mut snapshot = Snapshot::new();
        snapshot.insert("total", 12.5);
        snapshot.fill_missing(&defaults);

        assert_eq!(snapshot.get_f64("total"), Some(12.5));
        assert_eq!(snapshot.get_f64("user"), Some(0.0));
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn test_untagged_serialization() {
        let mut snapshot = Snapshot::new();
        snapshot.insert("cpucore", 4usize);
        snapshot.insert("total", 97.5);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"cpucore\":4"));
        assert!(json.contains("\"total\":97.5"));
    }
}
