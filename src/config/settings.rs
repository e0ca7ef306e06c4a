//! Application configuration

use super::defaults;
use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use sysglance_core::PluginConfig;

const QUALIFIER: &str = "io";
const ORGANIZATION: &str = "sysglance";
const APPLICATION: &str = "sysglance";

/// Application-wide configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the config format
    #[serde(default = "defaults::version")]
    pub version: u32,
    /// Seconds between two sampling cycles
    #[serde(default = "defaults::refresh_secs")]
    pub refresh_secs: f64,
    /// Milliseconds between keyboard polls
    #[serde(default = "defaults::poll_slice_ms")]
    pub poll_slice_ms: u64,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    /// Per-plugin overrides, merged over the built-in defaults
    #[serde(default)]
    pub plugins: BTreeMap<String, PluginConfig>,
}

impl AppConfig {
    /// Load configuration from disk
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            info!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }

        Self::load_from_path(&config_path)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_path()?)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.json"))
    }

    /// Default log file, next to other cached data
    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.cache_dir().join("sysglance.log"))
    }

    fn project_dirs() -> Result<directories::ProjectDirs> {
        directories::ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    /// Load configuration from a specific file path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a specific file path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Built-in plugin defaults with the user overrides applied
    pub fn plugin_configs(&self) -> BTreeMap<String, PluginConfig> {
        let mut configs = defaults::plugins();
        for (id, overrides) in &self.plugins {
            configs.entry(id.clone()).or_default().merge(overrides);
        }
        configs
    }

    /// Mark a plugin as disabled
    pub fn disable(&mut self, id: &str) {
        let mut config = self.plugin_configs().remove(id).unwrap_or_default();
        config.enabled = false;
        self.plugins.insert(id.to_string(), config);
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: defaults::version(),
            refresh_secs: defaults::refresh_secs(),
            poll_slice_ms: defaults::poll_slice_ms(),
            layout: LayoutConfig::default(),
            display: DisplayConfig::default(),
            plugins: BTreeMap::new(),
        }
    }
}

/// Layout configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Content width of the middle-left column
    #[serde(default = "defaults::middle_left_width")]
    pub middle_left_width: u16,
    /// Panel of the middle-right column that takes the remaining height
    #[serde(default = "defaults::flexible_panel")]
    pub flexible_panel: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            middle_left_width: defaults::middle_left_width(),
            flexible_panel: defaults::flexible_panel(),
        }
    }
}

/// Display configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Show one row per core instead of the CPU summary
    #[serde(default)]
    pub percpu: bool,
    #[serde(default = "defaults::max_processes")]
    pub max_processes: usize,
    /// "Local" or an IANA timezone name for the clock panel
    #[serde(default = "defaults::timezone")]
    pub timezone: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            percpu: false,
            max_processes: defaults::max_processes(),
            timezone: defaults::timezone(),
        }
    }
}
