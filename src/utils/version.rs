//! Version information utilities

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name from Cargo.toml
pub const PACKAGE_NAME: &str = env!("CARGO_PKG_NAME");

/// Get the current application version
pub fn get_version() -> &'static str {
    VERSION
}

/// Version with the build commit, when the build provides one
pub fn get_detailed_version() -> String {
    match option_env!("GIT_HASH") {
        Some(hash) => format!("{} ({})", VERSION, hash),
        None => VERSION.to_string(),
    }
}

/// User-Agent sent to the configuration database
pub fn user_agent() -> String {
    format!("{}/{}", PACKAGE_NAME, VERSION)
}
