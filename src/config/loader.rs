//! Configuration loading utilities
//!
//! Provides helper functions for loading configuration from various sources
//! with proper error handling and validation.

use crate::{Result, config::Settings};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_FILE_ENV: &str = "STREAM_CONFIG_FILE";

/// Configuration loader with multiple source support
#[derive(Debug)]
pub struct ConfigLoader {
    /// Default settings
    defaults: Settings,
}

impl ConfigLoader {
    /// Create new configuration loader
    pub fn new() -> Self {
        Self {
            defaults: Settings::default(),
        }
    }

    /// Get the config file path from STREAM_CONFIG_FILE or the default location
    ///
    /// Priority:
    /// 1. STREAM_CONFIG_FILE environment variable
    /// 2. ~/.config/stream-config-service/config.toml (or platform equivalent)
    pub fn get_config_path() -> Option<PathBuf> {
        if let Ok(config_path) = std::env::var(CONFIG_FILE_ENV) {
            let path = PathBuf::from(config_path);
            if path.exists() {
                debug!("Using config file from {}: {:?}", CONFIG_FILE_ENV, path);
                return Some(path);
            } else {
                warn!("{} points to non-existent file: {:?}", CONFIG_FILE_ENV, path);
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let default_path = config_dir.join("stream-config-service").join("config.toml");
            if default_path.exists() {
                debug!("Using default config file: {:?}", default_path);
                return Some(default_path);
            }
        }

        debug!("No config file found");
        None
    }

    /// Load configuration with precedence order:
    /// 1. Command line arguments (applied by the caller afterwards)
    /// 2. Environment variables
    /// 3. Configuration file
    /// 4. Default values
    pub fn load(&self, config_file: Option<&Path>) -> Result<Settings> {
        let mut settings = self.defaults.clone();

        if let Some(path) = config_file {
            if path.exists() {
                info!("Loading configuration from file: {:?}", path);
                settings = Settings::from_file(path)?;
            } else {
                warn!("Configuration file not found: {:?}, using defaults", path);
            }
        }

        debug!("Applying environment variable overrides");
        settings = settings.merge_with_env()?;

        settings.validate()?;

        if !settings.has_remote_source() {
            warn!("No configuration database address set; stream and device lookups are disabled");
        }

        debug!("Final configuration: {:?}", redacted(&settings));

        Ok(settings)
    }

    /// Load from an explicit path, or discover one when `config_file` is `None`
    pub fn load_with_discovery(&self, config_file: Option<&Path>) -> Result<Settings> {
        match config_file {
            Some(path) => self.load(Some(path)),
            None => self.load(Self::get_config_path().as_deref()),
        }
    }

    /// Load configuration from environment only
    pub fn from_env_only(&self) -> Result<Settings> {
        let settings = Settings::from_env()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Get default configuration
    pub fn defaults(&self) -> &Settings {
        &self.defaults
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn redacted(settings: &Settings) -> Settings {
    let mut shown = settings.clone();
    if shown.couch.password.is_some() {
        shown.couch.password = Some("***".to_string());
    }
    shown
}
