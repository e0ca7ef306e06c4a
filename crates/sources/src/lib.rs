//! sysglance-sources: Built-in plugins and the local metric source.

mod alert;
mod cpu;
pub mod defaults;
mod local;
mod mem;
mod network;
mod now;
mod percpu;
mod procfs;
#[cfg(test)]
mod testing;

pub use alert::{AlertFormatter, AlertPlugin, ALERT_ID};
pub use cpu::{CpuFormatter, CpuPlugin, CPU_ID};
pub use defaults::{plugin_config, plugin_configs, PLUGIN_IDS};
pub use local::LocalSource;
pub use mem::{MemFormatter, MemPlugin, MEM_ID};
pub use network::{NetworkFormatter, NetworkPlugin, NETWORK_ID};
pub use now::{NowFormatter, NowPlugin, NOW_ID};
pub use percpu::{PerCpuFormatter, PerCpuPlugin, PERCPU_ID};

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use sysglance_core::{BoxedPlugin, EventLog, InputMethod, PluginConfig, PluginRegistry, Zone};

/// Configuration of `id`, falling back to its built-in defaults
fn config_for(configs: &BTreeMap<String, PluginConfig>, id: &str) -> PluginConfig {
    configs.get(id).cloned().unwrap_or_else(|| plugin_config(id))
}

/// Register every enabled built-in plugin with the registry
///
/// Each plugin gets its own `LocalSource`, so the interval behind a
/// percentage is always the one since that plugin's previous sample.
pub fn register_all(
    registry: &mut PluginRegistry,
    configs: &BTreeMap<String, PluginConfig>,
    events: Rc<RefCell<EventLog>>,
    timezone: &str,
) {
    let local = || InputMethod::Local(Box::new(LocalSource::new()));

    let plugins: Vec<(Zone, BoxedPlugin)> = vec![
        (Zone::Top, Box::new(CpuPlugin::new(local(), config_for(configs, CPU_ID)))),
        (
            Zone::Top,
            Box::new(PerCpuPlugin::new(Box::new(LocalSource::new()), config_for(configs, PERCPU_ID))),
        ),
        (Zone::Top, Box::new(MemPlugin::new(local(), config_for(configs, MEM_ID)))),
        (
            Zone::MiddleLeft,
            Box::new(NetworkPlugin::new(Box::new(LocalSource::new()), config_for(configs, NETWORK_ID))),
        ),
        (Zone::MiddleRight, Box::new(AlertPlugin::new(events, config_for(configs, ALERT_ID)))),
        (Zone::Bottom, Box::new(NowPlugin::new(config_for(configs, NOW_ID), timezone))),
    ];

    for (zone, plugin) in plugins {
        if !plugin.state().config.enabled {
            log::info!("Plugin {} is disabled", plugin.metadata().id);
            continue;
        }
        registry.register(zone, plugin);
    }
    log::info!("Registered {} plugins", registry.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_all_zones() {
        let mut registry = PluginRegistry::new();
        register_all(&mut registry, &plugin_configs(), Rc::new(RefCell::new(EventLog::default())), "Local");
        assert_eq!(registry.ids(), vec!["cpu", "percpu", "mem", "network", "alert", "now"]);
        assert_eq!(registry.zone_of("network"), Some(Zone::MiddleLeft));
        assert_eq!(registry.zone_of("alert"), Some(Zone::MiddleRight));
        assert_eq!(registry.zone_of("now"), Some(Zone::Bottom));
    }

    #[test]
    fn test_disabled_plugins_are_skipped() {
        let mut configs = plugin_configs();
        if let Some(mem) = configs.get_mut(MEM_ID) {
            mem.enabled = false;
        }
        let mut registry = PluginRegistry::new();
        register_all(&mut registry, &configs, Rc::new(RefCell::new(EventLog::default())), "Local");
        assert!(registry.get(MEM_ID).is_none());
        assert_eq!(registry.len(), 5);
    }
}
