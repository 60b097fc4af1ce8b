//! Full configuration validation.
//!
//! Validates numeric ranges and backend settings. Each section has its own
//! function; this orchestrator calls them all and collects errors into a
//! single `ConfigError`.

mod helpers;
mod sections;


use crate::schema::LivewatchConfig;
use livewatch_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &LivewatchConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    sections::validate_poller(&mut errors, config);
    sections::validate_dispatch(&mut errors, config);
    sections::validate_cache(&mut errors, config);
    sections::validate_store(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

/// Check that the credentials needed to run the service are present.
///
/// Kept separate from [`validate`] so that admin commands which never talk
/// to Twitch or Discord work without secrets.
pub fn validate_credentials(config: &LivewatchConfig) -> Result<(), ConfigError> {
    let mut missing = Vec::new();
    if config.twitch.client_id.is_empty() {
        missing.push("twitch.client_id");
    }
    if config.twitch.client_secret.is_empty() {
        missing.push("twitch.client_secret");
    }
    if config.discord.bot_token.is_empty() {
        missing.push("discord.bot_token");
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "missing credentials: {}",
            missing.join(", ")
        )))
    }
}
