//! Registry of plugins partitioned into screen zones

use crate::plugin::{BoxedPlugin, SampledPlugin};
use log::{debug, warn};
use std::fmt;

/// Fixed display region of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Top,
    MiddleLeft,
    MiddleRight,
    Bottom,
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Zone::Top => "top",
            Zone::MiddleLeft => "middle-left",
            Zone::MiddleRight => "middle-right",
            Zone::Bottom => "bottom",
        };
        f.write_str(name)
    }
}

/// Ordered catalogue of plugins
///
/// Membership and order are fixed at startup. The registry never filters;
/// deciding what is shown is left to the layout engine each cycle.
#[derive(Default)]
pub struct PluginRegistry {
    entries: Vec<(Zone, BoxedPlugin)>,
}

impl PluginRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a plugin to a zone. Duplicate ids are ignored.
    pub fn register(&mut self, zone: Zone, plugin: BoxedPlugin) {
        let id = plugin.metadata().id.clone();
        if self.get(&id).is_some() {
            warn!("Plugin {} is already registered, ignoring", id);
            return;
        }
        debug!("Registered plugin {} in the {} zone", id, zone);
        self.entries.push((zone, plugin));
    }

    /// Plugins of one zone in render order
    pub fn zone(&self, zone: Zone) -> impl Iterator<Item = &dyn SampledPlugin> + '_ {
        self.entries
            .iter()
            .filter(move |(z, _)| *z == zone)
            .map(|(_, p)| p.as_ref())
    }

    /// Every plugin with its zone, in registration order
    pub fn iter(&self) -> impl Iterator<Item = (Zone, &dyn SampledPlugin)> + '_ {
        self.entries.iter().map(|(z, p)| (*z, p.as_ref()))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Zone, &mut BoxedPlugin)> + '_ {
        self.entries.iter_mut().map(|(z, p)| (*z, p))
    }

    pub fn get(&self, id: &str) -> Option<&dyn SampledPlugin> {
        self.entries
            .iter()
            .find(|(_, p)| p.metadata().id == id)
            .map(|(_, p)| p.as_ref())
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut BoxedPlugin> {
        self.entries
            .iter_mut()
            .find(|(_, p)| p.metadata().id == id)
            .map(|(_, p)| p)
    }

    pub fn zone_of(&self, id: &str) -> Option<Zone> {
        self.entries
            .iter()
            .find(|(_, p)| p.metadata().id == id)
            .map(|(z, _)| *z)
    }

    /// List all registered plugin IDs
    pub fn ids(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(_, p)| p.metadata().id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FormatError, SampleError};
    use crate::history::TrendHistory;
    use crate::plugin::{DisplayFormatter, FormatContext, PluginMetadata, PluginState};
    use sysglance_types::{DisplayLine, FieldMetadata, PluginConfig, Snapshot, ViewSet};

    struct Blank;

    impl DisplayFormatter for Blank {
        fn format(
            &self,
            _: &Snapshot,
            _: &ViewSet,
            _: &TrendHistory,
            _: &FormatContext,
        ) -> Result<Vec<DisplayLine>, FormatError> {
            Ok(Vec::new())
        }
    }

    struct Named {
        meta: PluginMetadata,
        state: PluginState,
    }

    fn named(id: &str) -> BoxedPlugin {
        Box::new(Named {
            meta: PluginMetadata::new(id, id, ""),
            state: PluginState::new(PluginConfig::default()),
        })
    }

    impl SampledPlugin for Named {
        fn metadata(&self) -> &PluginMetadata {
            &self.meta
        }
        fn fields(&self) -> Vec<FieldMetadata> {
            Vec::new()
        }
        fn state(&self) -> &PluginState {
            &self.state
        }
        fn state_mut(&mut self) -> &mut PluginState {
            &mut self.state
        }
        fn collect(&mut self, _: f64) -> Result<Snapshot, SampleError> {
            Ok(Snapshot::new())
        }
        fn init_snapshot(&self) -> Snapshot {
            Snapshot::new()
        }
        fn decorate(&self, _: &Snapshot) -> ViewSet {
            ViewSet::new()
        }
        fn formatter(&self) -> &dyn DisplayFormatter {
            &Blank
        }
    }

    #[test]
    fn test_zone_order_is_registration_order() {
        let mut registry = PluginRegistry::new();
        registry.register(Zone::Top, named("cpu"));
        registry.register(Zone::MiddleLeft, named("network"));
        registry.register(Zone::Top, named("mem"));
        registry.register(Zone::Bottom, named("now"));

        let top: Vec<&str> = registry.zone(Zone::Top).map(|p| p.metadata().id.as_str()).collect();
        assert_eq!(top, vec!["cpu", "mem"]);
        assert_eq!(registry.zone(Zone::MiddleRight).count(), 0);
        assert_eq!(registry.ids(), vec!["cpu", "network", "mem", "now"]);
        assert_eq!(registry.zone_of("now"), Some(Zone::Bottom));
    }

    #[test]
    fn test_duplicate_ids_are_ignored() {
        let mut registry = PluginRegistry::new();
        registry.register(Zone::Top, named("cpu"));
        registry.register(Zone::Bottom, named("cpu"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.zone_of("cpu"), Some(Zone::Top));
        assert!(registry.get_mut("cpu").is_some());
        assert!(registry.get("gpu").is_none());
    }
}
