//! Per-field decoration metadata

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Alert severity of a value, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Severity {
    /// Field has no configured threshold
    #[default]
    None,
    Ok,
    Caution,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::None => "NONE",
            Severity::Ok => "OK",
            Severity::Caution => "CAUTION",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
        }
    }

    /// Whether the severity is worth raising an alert event for
    pub fn is_alert(&self) -> bool {
        matches!(self, Severity::Warning | Severity::Critical)
    }
}

/// Alert boundaries for one field, compared with `>=`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub careful: f64,
    pub warning: f64,
    pub critical: f64,
    /// Record WARNING/CRITICAL transitions in the event log
    #[serde(default)]
    pub log: bool,
}

impl Thresholds {
    pub fn new(careful: f64, warning: f64, critical: f64) -> Self {
        Self {
            careful,
            warning,
            critical,
            log: false,
        }
    }

    pub fn logged(mut self) -> Self {
        self.log = true;
        self
    }

    /// Classify an already-normalized value
    pub fn classify(&self, value: f64) -> Severity {
        if value >= self.critical {
            Severity::Critical
        } else if value >= self.warning {
            Severity::Warning
        } else if value >= self.careful {
            Severity::Caution
        } else {
            Severity::Ok
        }
    }
}

/// Decoration of a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldView {
    pub severity: Severity,
    /// Field may be elided from narrow layouts
    pub optional: bool,
    /// Severity changes of this field feed the event log
    pub logged: bool,
}

/// Decorations for every field of a snapshot
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewSet {
    views: BTreeMap<String, FieldView>,
}

impl ViewSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, view: FieldView) {
        self.views.insert(key.into(), view);
    }

    pub fn get(&self, key: &str) -> Option<&FieldView> {
        self.views.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut FieldView> {
        self.views.get_mut(key)
    }

    /// Severity of a field, `Severity::None` when unknown
    pub fn severity(&self, key: &str) -> Severity {
        self.views.get(key).map(|v| v.severity).unwrap_or_default()
    }

    pub fn is_optional(&self, key: &str) -> bool {
        self.views.get(key).map(|v| v.optional).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldView)> {
        self.views.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}
