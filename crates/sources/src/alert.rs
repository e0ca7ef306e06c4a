//! Alert panel listing the most recent WARNING/CRITICAL events

use crate::defaults::plugin_config;
use chrono::{DateTime, Duration, Local};
use std::cell::RefCell;
use std::rc::Rc;
use sysglance_core::format::LineBuilder;
use sysglance_core::{
    AlertEvent, Decorator, DisplayFormatter, DisplayLine, DisplayStyle, EventLog, FieldMetadata,
    FieldUnit, FieldValue, FormatContext, FormatError, PluginConfig, PluginMetadata, PluginState,
    SampleError, SampledPlugin, Severity, Snapshot, TrendHistory, ViewSet,
};

pub const ALERT_ID: &str = "alert";

const EVENTS_KEY: &str = "events";

fn event_key(index: usize, part: &str) -> String {
    format!("event{}.{}", index, part)
}

/// `H:MM:SS`, hours unbounded
fn format_duration(duration: Duration) -> String {
    let seconds = duration.num_seconds().max(0);
    format!("{}:{:02}:{:02}", seconds / 3600, seconds / 60 % 60, seconds % 60)
}

fn parse_severity(state: &str) -> Severity {
    match state {
        "OK" => Severity::Ok,
        "CAUTION" => Severity::Caution,
        "WARNING" => Severity::Warning,
        "CRITICAL" => Severity::Critical,
        _ => Severity::None,
    }
}

/// Text before and after the state of one event
fn describe_event(event: &AlertEvent, now: DateTime<Local>) -> (String, String) {
    let when = if event.is_ongoing() {
        "ongoing".to_string()
    } else {
        format_duration(event.duration(now))
    };
    let head = format!("{} ({}) - ", event.begin.format("%Y-%m-%d %H:%M:%S"), when);
    let tail = format!(
        " on {}.{} ({:.1}/{:.1}/{:.1})",
        event.plugin,
        event.field,
        event.min,
        event.avg(),
        event.max
    );
    (head, tail)
}

pub struct AlertFormatter;

impl DisplayFormatter for AlertFormatter {
    fn format(
        &self,
        snapshot: &Snapshot,
        _views: &ViewSet,
        _history: &TrendHistory,
        _ctx: &FormatContext,
    ) -> Result<Vec<DisplayLine>, FormatError> {
        let count = snapshot.get_i64(EVENTS_KEY).unwrap_or(0).max(0) as usize;
        let mut b = LineBuilder::new();
        if count == 0 {
            b.title("No warning or critical alert detected");
            return Ok(b.build());
        }
        b.title("Warning or critical alerts");
        b.text(format!(" (last {} entries)", count));
        for index in 0..count {
            let part = |name: &str| {
                let key = event_key(index, name);
                snapshot
                    .get(&key)
                    .and_then(FieldValue::as_str)
                    .map(str::to_string)
                    .ok_or(FormatError::MissingField(key))
            };
            let state = part("state")?;
            b.newline();
            b.text(part("head")?);
            b.styled(state.clone(), DisplayStyle::from_severity(parse_severity(&state)));
            b.text(part("tail")?);
        }
        Ok(b.build())
    }
}

/// Source of the current local time
pub type LocalClock = Box<dyn Fn() -> DateTime<Local>>;

/// Alert plugin, reading the event log fed by the stats loop
pub struct AlertPlugin {
    metadata: PluginMetadata,
    state: PluginState,
    events: Rc<RefCell<EventLog>>,
    clock: LocalClock,
    formatter: AlertFormatter,
}

impl AlertPlugin {
    pub fn new(events: Rc<RefCell<EventLog>>, config: PluginConfig) -> Self {
        Self {
            metadata: PluginMetadata::new(ALERT_ID, "ALERT", "Recent warning and critical alerts"),
            state: PluginState::new(config),
            events,
            clock: Box::new(Local::now),
            formatter: AlertFormatter,
        }
    }

    pub fn with_defaults(events: Rc<RefCell<EventLog>>) -> Self {
        Self::new(events, plugin_config(ALERT_ID))
    }

    pub fn with_clock(mut self, clock: LocalClock) -> Self {
        self.clock = clock;
        self
    }
}

impl SampledPlugin for AlertPlugin {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    fn fields(&self) -> Vec<FieldMetadata> {
        vec![FieldMetadata::new(EVENTS_KEY, "Number of events listed", FieldUnit::Number)]
    }

    fn state(&self) -> &PluginState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PluginState {
        &mut self.state
    }

    fn collect(&mut self, _elapsed: f64) -> Result<Snapshot, SampleError> {
        let now = (self.clock)();
        let log = self.events.borrow();
        let events = log.for_display();

        let mut snapshot = Snapshot::new();
        snapshot.insert(EVENTS_KEY, events.len());
        for (index, event) in events.iter().enumerate() {
            let (head, tail) = describe_event(event, now);
            snapshot.insert(event_key(index, "head"), head);
            snapshot.insert(event_key(index, "state"), event.severity.as_str());
            snapshot.insert(event_key(index, "tail"), tail);
        }
        Ok(snapshot)
    }

    fn init_snapshot(&self) -> Snapshot {
        Snapshot::with_defaults([EVENTS_KEY], FieldValue::Int(0))
    }

    fn decorate(&self, snapshot: &Snapshot) -> ViewSet {
        Decorator::new(snapshot, &self.state.config, &self.fields()).finish()
    }

    fn formatter(&self) -> &dyn DisplayFormatter {
        &self.formatter
    }
}
