//! Tests for TOML config loading, creation, and path resolution.

use super::*;
use livewatch_common::ConfigError;
use std::path::Path;

#[test]
fn load_from_nonexistent_returns_file_not_found() {
    let result = load_from_path(Path::new("/tmp/nonexistent_livewatch_config.toml"));
    assert!(result.is_err());
    let err = result.unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound(_)));
}

#[test]
fn load_valid_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r##"
[poller]
interval_secs = 120
initial_delay_secs = 0

[store]
path = "/var/lib/livewatch/state.db"
"##,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.poller.interval_secs, 120);
    assert_eq!(config.poller.initial_delay_secs, 0);
    assert_eq!(config.store.path, "/var/lib/livewatch/state.db");
    // Defaults preserved
    assert_eq!(config.poller.batch_size, 100);
    assert_eq!(config.cache.ttl_secs, 86_400);
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is not valid toml {{{").unwrap();

    let result = load_from_path(&path);
    assert!(result.is_err());
    let err = result.unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
}

#[test]
fn load_config_with_invalid_values_returns_parsed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[poller]
batch_size = 500
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    // Parsed config returned with invalid values; callers validate again
    assert_eq!(config.poller.batch_size, 500);
}

#[test]
fn create_and_load_default_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("livewatch").join("config.toml");

    create_default_config(&path).unwrap();
    assert!(path.exists());

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.poller.interval_secs, 300);
    assert_eq!(config.dispatch.footer, "Livewatch Live Notifications");
}

#[test]
fn default_config_toml_is_valid() {
    use super::template::default_config_toml;
    use crate::schema::LivewatchConfig;

    let content = default_config_toml();
    let config: LivewatchConfig = toml::from_str(&content).unwrap();
    assert_eq!(config.poller.batch_size, 100);
    assert!(crate::validation::validate(&config).is_ok());
}

#[test]
fn default_config_path_is_reasonable() {
    // This may not work in all CI environments, but should work locally
    if let Ok(path) = default_config_path() {
        let path_str = path.to_string_lossy();
        assert!(path_str.contains("livewatch"));
        assert!(path_str.ends_with("config.toml"));
    }
}
