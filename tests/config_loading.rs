//! Configuration loading integration tests
//!
//! Covers STREAM_CONFIG_FILE discovery and the file < env precedence.

use std::io::Write;
use std::sync::Mutex;
use stream_config_service::config::{ConfigLoader, loader::CONFIG_FILE_ENV};
use tempfile::NamedTempFile;

// Static mutex to ensure environment variable tests don't interfere with each other
static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

fn write_config(contents: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file, "{}", contents).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_config_file_env_var_loading() {
    let _lock = ENV_TEST_MUTEX.lock().unwrap();

    let temp_file = write_config(
        r#"
[server]
host = "127.0.0.1"
port = 9999

[couch]
address = "http://couch.local:5984"
database = "site-configs"
        "#,
    );

    let original_config = std::env::var(CONFIG_FILE_ENV).ok();
    unsafe {
        std::env::set_var(CONFIG_FILE_ENV, temp_file.path());
    }

    let settings = ConfigLoader::new().load_with_discovery(None);

    unsafe {
        std::env::remove_var(CONFIG_FILE_ENV);
        if let Some(config) = original_config {
            std::env::set_var(CONFIG_FILE_ENV, config);
        }
    }

    let settings = settings.unwrap();
    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 9999);
    assert_eq!(settings.couch.database, "site-configs");
    assert!(settings.has_remote_source());
}

#[test]
fn test_explicit_path_wins_over_env_var() {
    let _lock = ENV_TEST_MUTEX.lock().unwrap();

    let from_env = write_config("[server]\nport = 1111");
    let explicit = write_config("[server]\nport = 2222");

    unsafe {
        std::env::set_var(CONFIG_FILE_ENV, from_env.path());
    }
    let settings = ConfigLoader::new().load_with_discovery(Some(explicit.path()));
    unsafe {
        std::env::remove_var(CONFIG_FILE_ENV);
    }

    assert_eq!(settings.unwrap().server.port, 2222);
}

#[test]
fn test_database_env_vars_override_file() {
    let _lock = ENV_TEST_MUTEX.lock().unwrap();

    let temp_file = write_config(
        r#"
[couch]
address = "http://from-file:5984"
username = "file-user"

[cache]
path = "/var/lib/from-file.db"
        "#,
    );

    unsafe {
        std::env::set_var("DB_ADDRESS", "http://from-env:5984");
        std::env::set_var("DB_PASSWORD", "env-password");
        std::env::set_var("CACHE_DATABASE_LOCATION", "/tmp/from-env.db");
    }

    let settings = ConfigLoader::new().load(Some(temp_file.path()));

    unsafe {
        std::env::remove_var("DB_ADDRESS");
        std::env::remove_var("DB_PASSWORD");
        std::env::remove_var("CACHE_DATABASE_LOCATION");
    }

    let settings = settings.unwrap();
    assert_eq!(settings.couch.address.as_deref(), Some("http://from-env:5984"));
    assert_eq!(settings.couch.username.as_deref(), Some("file-user"));
    assert_eq!(settings.couch.password.as_deref(), Some("env-password"));
    assert_eq!(
        settings.cache.path,
        std::path::PathBuf::from("/tmp/from-env.db")
    );
}

#[test]
fn test_invalid_log_level_is_rejected() {
    let _lock = ENV_TEST_MUTEX.lock().unwrap();

    let temp_file = write_config("[logging]\nlevel = \"loud\"");

    let result = ConfigLoader::new().load(Some(temp_file.path()));
    assert!(result.is_err());
}

#[test]
fn test_optional_sections_take_defaults() {
    let _lock = ENV_TEST_MUTEX.lock().unwrap();

    let temp_file = write_config("[logging]\nverbose = true");

    let settings = ConfigLoader::new().load(Some(temp_file.path())).unwrap();

    assert!(settings.logging.verbose);
    assert_eq!(settings.server.port, 9013);
    assert_eq!(settings.couch.stream_document, "streams");
    assert_eq!(settings.cache.stream_namespace, "streams");
    assert_eq!(settings.cache.device_namespace, "devices");
}
