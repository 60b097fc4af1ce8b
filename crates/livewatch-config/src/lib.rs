//! Livewatch configuration system.
//!
//! Provides TOML-based configuration with environment overrides for
//! secrets and full validation. All config sections use sensible defaults
//! so partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use livewatch_config::{load_config, config_to_json};
//!
//! let config = load_config(None).expect("failed to load config");
//! let json = config_to_json(&config);
//! println!("{json}");
//! ```

pub mod env;
pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{LivewatchConfig, CONFIG_SCHEMA_VERSION};

use livewatch_common::ConfigError;
use std::path::Path;

/// Load config from `path`, or from the platform default path when `None`.
///
/// The default path gets a commented template written to it if missing.
/// Environment overrides are applied after the file is read, then the
/// result is validated.
pub fn load_config(path: Option<&Path>) -> Result<LivewatchConfig, ConfigError> {
    let mut config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };

    env::apply_env_overrides(&mut config);

    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string with secrets redacted.
pub fn config_to_json(config: &LivewatchConfig) -> String {
    serde_json::to_string_pretty(&config.redacted())
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_to_json_contains_all_sections() {
        let config = LivewatchConfig::default();
        let json = config_to_json(&config);
        assert!(json.contains("\"poller\""));
        assert!(json.contains("\"dispatch\""));
        assert!(json.contains("\"cache\""));
        assert!(json.contains("\"store\""));
        assert!(json.contains("\"twitch\""));
        assert!(json.contains("\"discord\""));
        assert!(json.contains("\"logging\""));
    }

    #[test]
    fn config_to_json_redacts_secrets() {
        let mut config = LivewatchConfig::default();
        config.discord.bot_token = "very-secret-token".into();
        let json = config_to_json(&config);
        assert!(!json.contains("very-secret-token"));
        assert!(json.contains("[REDACTED]"));
    }

    #[test]
    fn config_schema_version_is_1() {
        assert_eq!(CONFIG_SCHEMA_VERSION, 1);
    }

    #[test]
    fn load_config_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[poller]\ninterval_secs = 5\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn default_config_round_trips_through_json() {
        let config = LivewatchConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: LivewatchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.poller.interval_secs, 300);
        assert_eq!(parsed.cache.key_prefix, "livewatch:presence:");
    }
}
