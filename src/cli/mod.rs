//! Command-line entry points
//!
//! `server` runs the HTTP service; `stream`, `device` and `sign` are
//! one-shot commands that print JSON (or a token suffix) to stdout and log
//! to stderr.

pub mod lookup;
pub mod server;

use crate::{Settings, config::ConfigLoader};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Load settings from an explicit file or the discovered default location
pub fn load_settings(config: Option<&str>) -> crate::Result<Settings> {
    ConfigLoader::new().load_with_discovery(config.map(Path::new))
}

/// Log filter with precedence: `--verbose` > `RUST_LOG` > configured level
pub fn build_env_filter(verbose: bool, configured_level: &str) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(configured_level)
    }
}
