//! Alert event log
//!
//! Logged fields that reach WARNING or CRITICAL open an event; the event
//! stays ongoing while the field remains in alert and is closed once the
//! field drops back below the warning boundary.

use crate::constants::MAX_EVENTS;
use chrono::{DateTime, Local};
use log::info;
use std::collections::VecDeque;
use sysglance_types::Severity;

/// One alert episode of a single field
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    pub plugin: String,
    pub field: String,
    pub begin: DateTime<Local>,
    /// `None` while the event is ongoing
    pub end: Option<DateTime<Local>>,
    pub severity: Severity,
    pub min: f64,
    pub max: f64,
    sum: f64,
    pub count: u32,
}

impl AlertEvent {
    fn open(plugin: &str, field: &str, severity: Severity, value: f64, now: DateTime<Local>) -> Self {
        Self {
            plugin: plugin.to_string(),
            field: field.to_string(),
            begin: now,
            end: None,
            severity,
            min: value,
            max: value,
            sum: value,
            count: 1,
        }
    }

    pub fn is_ongoing(&self) -> bool {
        self.end.is_none()
    }

    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    /// Duration of the event, up to `now` while ongoing
    pub fn duration(&self, now: DateTime<Local>) -> chrono::Duration {
        self.end.unwrap_or(now) - self.begin
    }

    fn update(&mut self, severity: Severity, value: f64) {
        // Once critical, an event stays critical
        self.severity = self.severity.max(severity);
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += value;
        self.count += 1;
    }
}

/// Most recent alert events, newest first
#[derive(Debug, Clone)]
pub struct EventLog {
    events: VecDeque<AlertEvent>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    fn ongoing_index(&self, plugin: &str, field: &str) -> Option<usize> {
        self.events
            .iter()
            .position(|e| e.is_ongoing() && e.plugin == plugin && e.field == field)
    }

    /// Feed the current severity of a logged field
    pub fn record(&mut self, plugin: &str, field: &str, severity: Severity, value: f64, now: DateTime<Local>) {
        match (self.ongoing_index(plugin, field), severity.is_alert()) {
            (Some(index), true) => self.events[index].update(severity, value),
            (Some(index), false) => {
                self.events[index].end = Some(now);
                info!("Alert on {}.{} ended", plugin, field);
            }
            (None, true) => {
                info!("Alert on {}.{}: {}", plugin, field, severity.as_str());
                self.events
                    .push_front(AlertEvent::open(plugin, field, severity, value, now));
                self.events.truncate(self.capacity);
            }
            (None, false) => {}
        }
    }

    /// Close every ongoing event
    pub fn close_all(&mut self, now: DateTime<Local>) {
        for event in self.events.iter_mut().filter(|e| e.is_ongoing()) {
            event.end = Some(now);
        }
    }

    /// Events ordered for display: ongoing first, then newest first
    pub fn for_display(&self) -> Vec<&AlertEvent> {
        let mut events: Vec<&AlertEvent> = self.events.iter().collect();
        events.sort_by_key(|e| !e.is_ongoing());
        events
    }

    pub fn iter(&self) -> impl Iterator<Item = &AlertEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(MAX_EVENTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(seconds: i64) -> DateTime<Local> {
        Local.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
    }

    #[test]
    fn test_event_lifecycle() {
        let mut log = EventLog::default();
        log.record("cpu", "total", Severity::Ok, 10.0, at(0));
        assert!(log.is_empty());

        log.record("cpu", "total", Severity::Warning, 80.0, at(2));
        log.record("cpu", "total", Severity::Critical, 90.0, at(4));
        log.record("cpu", "total", Severity::Warning, 76.0, at(6));
        assert_eq!(log.len(), 1);
        let event = log.iter().next().unwrap();
        assert!(event.is_ongoing());
        assert_eq!(event.severity, Severity::Critical);
        assert_eq!(event.count, 3);
        assert_eq!(event.min, 76.0);
        assert_eq!(event.max, 90.0);
        assert!((event.avg() - 82.0).abs() < 1e-9);

        log.record("cpu", "total", Severity::Caution, 66.0, at(8));
        let event = log.iter().next().unwrap();
        assert!(!event.is_ongoing());
        assert_eq!(event.duration(at(100)).num_seconds(), 6);
    }

    #[test]
    fn test_log_is_bounded_newest_first() {
        let mut log = EventLog::new(3);
        for i in 0..5 {
            let field = format!("f{}", i);
            log.record("mem", &field, Severity::Warning, 75.0, at(i));
        }
        let fields: Vec<&str> = log.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["f4", "f3", "f2"]);
    }

    #[test]
    fn test_display_order_puts_ongoing_first() {
        let mut log = EventLog::default();
        log.record("cpu", "user", Severity::Warning, 75.0, at(0));
        log.record("mem", "percent", Severity::Warning, 75.0, at(1));
        log.record("mem", "percent", Severity::Ok, 20.0, at(2));
        let order: Vec<&str> = log.for_display().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(order, vec!["user", "percent"]);

        log.close_all(at(3));
        assert!(log.iter().all(|e| !e.is_ongoing()));
    }
}
