//! Configuration management for the configuration service
//!
//! This module handles loading and managing settings for the HTTP server
//! and the one-shot lookup commands.

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::{CacheSettings, CouchSettings, LoggingSettings, ServerSettings, Settings};
