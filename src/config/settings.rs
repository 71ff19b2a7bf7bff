//! Service settings
//!
//! Settings come from a TOML file, environment variables and command-line
//! overrides. Every field has a default, so an empty file (or no file at
//! all) yields a runnable configuration without a remote source.

use crate::resolver::Namespaces;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// Helper functions for serde defaults
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9013
}

fn default_database() -> String {
    "stream-configs".to_string()
}

fn default_stream_document() -> String {
    "streams".to_string()
}

fn default_device_document() -> String {
    "devices".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("cache.db")
}

fn default_stream_namespace() -> String {
    "streams".to_string()
}

fn default_device_namespace() -> String {
    "devices".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration settings for the configuration service
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Server configuration
    #[serde(default)]
    pub server: ServerSettings,
    /// Remote configuration database
    #[serde(default)]
    pub couch: CouchSettings,
    /// Persistent cache
    #[serde(default)]
    pub cache: CacheSettings,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// CouchDB connection settings
///
/// Without an `address` the service has no remote source: lookups are
/// unavailable and playback URLs are never signed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchSettings {
    /// Base URL of the CouchDB server
    #[serde(default)]
    pub address: Option<String>,
    /// Basic auth user
    #[serde(default)]
    pub username: Option<String>,
    /// Basic auth password
    #[serde(default)]
    pub password: Option<String>,
    /// Database holding the configuration documents
    #[serde(default = "default_database")]
    pub database: String,
    /// Document id of the stream map
    #[serde(default = "default_stream_document")]
    pub stream_document: String,
    /// Document id of the device map
    #[serde(default = "default_device_document")]
    pub device_document: String,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

/// Persistent cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Database file; created on first use
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,
    #[serde(default = "default_stream_namespace")]
    pub stream_namespace: String,
    #[serde(default = "default_device_namespace")]
    pub device_namespace: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Shorthand for `level = "debug"`
    #[serde(default)]
    pub verbose: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for CouchSettings {
    fn default() -> Self {
        Self {
            address: None,
            username: None,
            password: None,
            database: default_database(),
            stream_document: default_stream_document(),
            device_document: default_device_document(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
            stream_namespace: default_stream_namespace(),
            device_namespace: default_device_namespace(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            verbose: false,
        }
    }
}

impl CacheSettings {
    /// Namespaces the resolver files records under
    pub fn namespaces(&self) -> Namespaces {
        Namespaces::new(&self.stream_namespace, &self.device_namespace)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default settings with environment overrides applied
    pub fn from_env() -> crate::Result<Self> {
        Self::default().merge_with_env()
    }

    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::config("file", &format!("Failed to read config file: {}", e))
        })?;

        let settings: Settings = toml::from_str(&content).map_err(|e| {
            crate::Error::config("file", &format!("Failed to parse config file: {}", e))
        })?;

        Ok(settings)
    }

    /// Apply environment variable overrides; unset or empty variables leave
    /// the current value alone
    pub fn merge_with_env(mut self) -> crate::Result<Self> {
        if let Some(address) = non_empty_var("DB_ADDRESS") {
            self.couch.address = Some(address);
        }
        if let Some(username) = non_empty_var("DB_USERNAME") {
            self.couch.username = Some(username);
        }
        if let Some(password) = non_empty_var("DB_PASSWORD") {
            self.couch.password = Some(password);
        }
        if let Some(database) = non_empty_var("STREAM_CONFIG_DB") {
            self.couch.database = database;
        }

        if let Some(path) = non_empty_var("CACHE_DATABASE_LOCATION") {
            self.cache.path = PathBuf::from(path);
        }

        if let Some(host) = non_empty_var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = non_empty_var("SERVER_PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| crate::Error::config("port", &format!("Invalid port: {}", e)))?;
        }

        if let Some(level) = non_empty_var("LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(self)
    }

    /// Whether a remote configuration source is configured
    pub fn has_remote_source(&self) -> bool {
        self.couch
            .address
            .as_deref()
            .is_some_and(|address| !address.is_empty())
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.server.port == 0 {
            return Err(crate::Error::config(
                "port",
                "Invalid server port: cannot be 0",
            ));
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(crate::Error::config(
                    "log_level",
                    &format!("Invalid log level: {}", self.logging.level),
                ));
            }
        }

        if let Some(address) = &self.couch.address
            && let Err(e) = url::Url::parse(address)
        {
            return Err(crate::Error::config(
                "couch.address",
                &format!("Invalid database address '{}': {}", address, e),
            ));
        }

        for (name, namespace) in [
            ("cache.stream_namespace", &self.cache.stream_namespace),
            ("cache.device_namespace", &self.cache.device_namespace),
        ] {
            if namespace.trim().is_empty() {
                return Err(crate::Error::config(name, "Cache namespace cannot be empty"));
            }
        }

        if self.cache.stream_namespace == self.cache.device_namespace {
            return Err(crate::Error::config(
                "cache.device_namespace",
                "Stream and device namespaces must differ",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Static mutex to ensure environment variable tests don't interfere with each other
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 9013);
        assert_eq!(settings.couch.address, None);
        assert_eq!(settings.couch.database, "stream-configs");
        assert_eq!(settings.couch.stream_document, "streams");
        assert_eq!(settings.couch.device_document, "devices");
        assert_eq!(settings.cache.path, PathBuf::from("cache.db"));
        assert_eq!(settings.logging.level, "info");
        assert!(!settings.has_remote_source());
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[server]
port = 8080

[couch]
address = "http://couch.local:5984"
username = "reader"

[cache]
path = "/var/lib/stream-config/cache.db"
stream_namespace = "s"
        "#
        )
        .unwrap();

        let settings = Settings::from_file(temp_file.path()).unwrap();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(
            settings.couch.address.as_deref(),
            Some("http://couch.local:5984")
        );
        assert_eq!(settings.couch.username.as_deref(), Some("reader"));
        assert_eq!(settings.couch.password, None);
        assert_eq!(settings.couch.request_timeout, 30);
        assert_eq!(settings.cache.namespaces(), Namespaces::new("s", "devices"));
        assert!(settings.has_remote_source());
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[server\nport = ").unwrap();

        let err = Settings::from_file(temp_file.path()).unwrap_err();
        assert!(matches!(err, crate::Error::Config { .. }));
    }

    #[test]
    fn test_env_var_override() {
        let _lock = ENV_TEST_MUTEX.lock().unwrap();

        unsafe {
            std::env::set_var("DB_ADDRESS", "http://couch:5984");
            std::env::set_var("DB_USERNAME", "admin");
            std::env::set_var("CACHE_DATABASE_LOCATION", "/tmp/streams.db");
            std::env::set_var("SERVER_PORT", "9100");
        }

        let settings = Settings::from_env();

        unsafe {
            std::env::remove_var("DB_ADDRESS");
            std::env::remove_var("DB_USERNAME");
            std::env::remove_var("CACHE_DATABASE_LOCATION");
            std::env::remove_var("SERVER_PORT");
        }

        let settings = settings.unwrap();
        assert_eq!(settings.couch.address.as_deref(), Some("http://couch:5984"));
        assert_eq!(settings.couch.username.as_deref(), Some("admin"));
        assert_eq!(settings.cache.path, PathBuf::from("/tmp/streams.db"));
        assert_eq!(settings.server.port, 9100);
    }

    #[test]
    fn test_empty_env_var_is_ignored() {
        let _lock = ENV_TEST_MUTEX.lock().unwrap();

        unsafe {
            std::env::set_var("DB_ADDRESS", "");
        }
        let settings = Settings::from_env();
        unsafe {
            std::env::remove_var("DB_ADDRESS");
        }

        assert!(!settings.unwrap().has_remote_source());
    }

    #[test]
    fn test_invalid_env_port() {
        let _lock = ENV_TEST_MUTEX.lock().unwrap();

        unsafe {
            std::env::set_var("SERVER_PORT", "not-a-port");
        }
        let result = Settings::from_env();
        unsafe {
            std::env::remove_var("SERVER_PORT");
        }

        assert!(matches!(result, Err(crate::Error::Config { .. })));
    }

    #[test]
    fn test_validate_defaults() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_port_zero() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_log_level() {
        let mut settings = Settings::default();
        settings.logging.level = "chatty".to_string();
        assert!(settings.validate().is_err());

        settings.logging.level = "WARN".to_string();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_address() {
        let mut settings = Settings::default();
        settings.couch.address = Some("couch without scheme".to_string());
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_namespaces() {
        let mut settings = Settings::default();
        settings.cache.device_namespace = "  ".to_string();
        assert!(settings.validate().is_err());

        settings.cache.device_namespace = "streams".to_string();
        assert!(settings.validate().is_err());
    }
}
