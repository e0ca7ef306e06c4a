//! Sampling of every registered plugin, once per cycle

use crate::config::AppConfig;
use chrono::{DateTime, Local};
use log::trace;
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;
use sysglance_core::{EventLog, FormatContext, PluginRegistry};

/// All plugins plus the alert event log they feed
pub struct Stats {
    registry: PluginRegistry,
    events: Rc<RefCell<EventLog>>,
}

impl Stats {
    pub fn new(registry: PluginRegistry, events: Rc<RefCell<EventLog>>) -> Self {
        Self { registry, events }
    }

    /// Register the built-in plugins as configured
    pub fn from_config(config: &AppConfig) -> Self {
        let events = Rc::new(RefCell::new(EventLog::default()));
        let mut registry = PluginRegistry::new();
        sysglance_sources::register_all(
            &mut registry,
            &config.plugin_configs(),
            Rc::clone(&events),
            &config.display.timezone,
        );
        Self::new(registry, events)
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn events(&self) -> Rc<RefCell<EventLog>> {
        Rc::clone(&self.events)
    }

    pub fn update(&mut self) {
        self.update_at(Instant::now(), Local::now());
    }

    /// Sample every plugin in registry order.
    ///
    /// Logged fields are fed to the event log right after their plugin is
    /// sampled, so panels registered later see this cycle's events.
    pub fn update_at(&mut self, now: Instant, wall: DateTime<Local>) {
        for (_, plugin) in self.registry.iter_mut() {
            plugin.sample_at(now);

            let id = plugin.metadata().id.clone();
            let snapshot = plugin.snapshot();
            let mut events = self.events.borrow_mut();
            for (field, view) in plugin.views().iter().filter(|(_, v)| v.logged) {
                if let Some(value) = snapshot.get_f64(field) {
                    events.record(&id, field, view.severity, value, wall);
                }
            }
        }
        trace!("Sampled {} plugins", self.registry.len());
    }

    /// Close ongoing events before exit
    pub fn close(&mut self) {
        self.events.borrow_mut().close_all(Local::now());
    }

    /// Every snapshot as JSON, keyed by plugin id
    pub fn to_json(&self, ctx: &FormatContext) -> serde_json::Result<Value> {
        let mut plugins = Map::new();
        for (_, plugin) in self.registry.iter() {
            if !plugin.is_displayed(ctx) {
                continue;
            }
            plugins.insert(plugin.metadata().id.clone(), serde_json::to_value(plugin.snapshot())?);
        }
        Ok(Value::Object(plugins))
    }
}
