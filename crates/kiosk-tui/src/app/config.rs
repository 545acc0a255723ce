//! Terminal configuration persistence
//!
//! Loads the session policy and terminal preferences from a JSON file in the
//! user's configuration directory.

use std::fs;
use std::path::{Path, PathBuf};

use kiosk_core::SessionPolicy;
use serde::{Deserialize, Serialize};

/// Configuration file name
const CONFIG_FILE_NAME: &str = "config.json";

/// Configuration directory under ~/.config
const CONFIG_DIR_NAME: &str = "kiosk";

/// Log file name used when none is configured
const LOG_FILE_NAME: &str = "kiosk-tui.log";

/// Terminal configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TuiConfig {
    /// Policy handed to every page
    #[serde(default)]
    pub session: SessionPolicy,

    /// Let the operator clear the lockdown flag from the keyboard
    #[serde(default)]
    pub allow_manual_lockdown_reset: bool,

    /// Artificial delay applied by the simulated backend to every request
    #[serde(default = "default_latency_ms")]
    pub simulated_latency_ms: u64,

    /// Where log lines go; defaults to the config directory
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_latency_ms() -> u64 {
    1000
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            session: SessionPolicy::default(),
            allow_manual_lockdown_reset: false,
            simulated_latency_ms: default_latency_ms(),
            log_file: None,
        }
    }
}

impl TuiConfig {
    /// Get the configuration directory path
    pub fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg_config).join(CONFIG_DIR_NAME));
        }

        dirs::config_dir().map(|p| p.join(CONFIG_DIR_NAME))
    }

    /// Get the full config file path
    pub fn config_file_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default location
    ///
    /// Returns default configuration if the file doesn't exist or can't be parsed.
    pub fn load() -> Self {
        match Self::config_file_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {:?}: {}", path, e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Failed to read config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_file_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Save configuration to a specific file, creating its directory
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| ConfigError::Io(e.to_string()))?;
            }
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, contents).map_err(|e| ConfigError::Io(e.to_string()))?;

        tracing::debug!("Saved config to {:?}", path);
        Ok(())
    }

    /// Resolve the log file path
    pub fn log_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.log_file {
            return Ok(path.clone());
        }
        Self::config_dir()
            .map(|d| d.join(LOG_FILE_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialize(String),
}
