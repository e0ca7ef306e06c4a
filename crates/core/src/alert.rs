//! Threshold classification of snapshot fields

use sysglance_types::{FieldMetadata, FieldView, PluginConfig, Severity, Snapshot, Thresholds, ViewSet};

/// Classify `current` as a percentage of `maximum`.
///
/// Fields without thresholds, and capacities that are not positive, get
/// `Severity::None`.
pub fn classify(current: f64, maximum: f64, thresholds: Option<&Thresholds>) -> Severity {
    let Some(thresholds) = thresholds else {
        return Severity::None;
    };
    if maximum.is_nan() || maximum <= 0.0 || !current.is_finite() {
        return Severity::None;
    }
    thresholds.classify(current * 100.0 / maximum)
}

/// Builds the `ViewSet` of a finalized snapshot
///
/// Every snapshot key gets a view carrying its static `optional` flag.
/// Alert calls then fill in severities; scaled maxima can read any other
/// field because the snapshot is complete by the time it is decorated.
pub struct Decorator<'a> {
    snapshot: &'a Snapshot,
    config: &'a PluginConfig,
    views: ViewSet,
}

impl<'a> Decorator<'a> {
    pub fn new(snapshot: &'a Snapshot, config: &'a PluginConfig, fields: &[FieldMetadata]) -> Self {
        let mut views = ViewSet::new();
        for key in snapshot.keys() {
            let optional = fields.iter().any(|f| f.id == key && f.optional);
            views.insert(
                key,
                FieldView {
                    optional,
                    ..FieldView::default()
                },
            );
        }
        Self {
            snapshot,
            config,
            views,
        }
    }

    /// Classify a percentage field against its own thresholds
    pub fn alert(self, field: &str) -> Self {
        self.alert_as(field, field, 100.0)
    }

    /// Classify against a capacity taken from elsewhere in the snapshot
    pub fn alert_scaled(self, field: &str, maximum: f64) -> Self {
        self.alert_as(field, field, maximum)
    }

    /// Classify `field` using the thresholds configured under `threshold_key`
    pub fn alert_as(mut self, field: &str, threshold_key: &str, maximum: f64) -> Self {
        let Some(current) = self.snapshot.get_f64(field) else {
            return self;
        };
        let thresholds = self.config.threshold(threshold_key);
        let severity = classify(current, maximum, thresholds);
        let logged = thresholds.is_some_and(|t| t.log);
        if let Some(view) = self.views.get_mut(field) {
            view.severity = severity;
            view.logged = logged;
        }
        self
    }

    /// Value of another field, used as a capacity
    pub fn value(&self, field: &str) -> Option<f64> {
        self.snapshot.get_f64(field)
    }

    pub fn finish(self) -> ViewSet {
        self.views
    }
}
