//! Configuration types for the search panel.

use search_merge::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{PanelError, Result};

/// Top-level configuration, loaded from TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Merge/rank settings.
    pub pipeline: PipelineConfig,
    /// Session coordinator settings.
    pub session: SessionConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Settings for the async session coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Bounded capacity of the coordinator's inbox.
    pub channel_capacity: usize,
    /// Upper bound on a single provider fetch, in milliseconds. A provider
    /// that takes longer is treated as having no results yet.
    pub provider_timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
            provider_timeout_ms: 2_000,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "search_panel=info,search_merge=info".to_owned(),
        }
    }
}

impl PanelConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| PanelError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| PanelError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/search-panel/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("search-panel").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("search-panel")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/search-panel-config/config.toml")
        }
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Pipeline`] for pipeline problems and
    /// [`PanelError::Config`] for session problems.
    pub fn validate(&self) -> Result<()> {
        self.pipeline.validate()?;
        if self.session.channel_capacity == 0 {
            return Err(PanelError::Config(
                "channel_capacity must be greater than 0".into(),
            ));
        }
        if self.session.provider_timeout_ms == 0 {
            return Err(PanelError::Config(
                "provider_timeout_ms must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
