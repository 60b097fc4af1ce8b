//! Environment overrides for secrets and deployment-specific settings.
//!
//! Applied after the TOML file is loaded. Empty variables are ignored.

use crate::schema::{CacheBackendKind, LivewatchConfig};

pub const TWITCH_CLIENT_ID: &str = "TWITCH_CLIENT_ID";
pub const TWITCH_CLIENT_SECRET: &str = "TWITCH_CLIENT_SECRET";
pub const DISCORD_TOKEN: &str = "DISCORD_TOKEN";
pub const REDIS_ADDR: &str = "REDIS_ADDR";
pub const DB_PATH: &str = "LIVEWATCH_DB_PATH";
pub const POLL_INTERVAL_SECS: &str = "LIVEWATCH_POLL_INTERVAL_SECS";

#[must_use]
fn read_non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: &mut LivewatchConfig) {
    apply_overrides(config, read_non_empty_env);
}

/// Apply overrides using `lookup` to resolve variable names.
pub fn apply_overrides<F>(config: &mut LivewatchConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(id) = lookup(TWITCH_CLIENT_ID) {
        config.twitch.client_id = id;
    }
    if let Some(secret) = lookup(TWITCH_CLIENT_SECRET) {
        config.twitch.client_secret = secret;
    }
    if let Some(token) = lookup(DISCORD_TOKEN) {
        config.discord.bot_token = token;
    }
    if let Some(addr) = lookup(REDIS_ADDR) {
        config.cache.backend = CacheBackendKind::Redis;
        config.cache.redis_url = normalize_redis_addr(&addr);
    }
    if let Some(path) = lookup(DB_PATH) {
        config.store.path = path;
    }
    if let Some(raw) = lookup(POLL_INTERVAL_SECS) {
        match raw.parse::<u64>() {
            Ok(secs) => config.poller.interval_secs = secs,
            Err(_) => tracing::warn!("ignoring {POLL_INTERVAL_SECS}={raw}: not a number"),
        }
    }
}

/// Accept either a full `redis://` URL or a bare `host:port`.
fn normalize_redis_addr(addr: &str) -> String {
    if addr.starts_with("redis://") || addr.starts_with("rediss://") {
        addr.to_string()
    } else {
        format!("redis://{addr}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn secrets_are_overridden() {
        let mut config = LivewatchConfig::default();
        apply_overrides(
            &mut config,
            lookup_from(&[
                (TWITCH_CLIENT_ID, "cid"),
                (TWITCH_CLIENT_SECRET, "csecret"),
                (DISCORD_TOKEN, "bot"),
            ]),
        );
        assert_eq!(config.twitch.client_id, "cid");
        assert_eq!(config.twitch.client_secret, "csecret");
        assert_eq!(config.discord.bot_token, "bot");
    }

    #[test]
    fn redis_addr_switches_backend() {
        let mut config = LivewatchConfig::default();
        apply_overrides(&mut config, lookup_from(&[(REDIS_ADDR, "cache:6379")]));
        assert_eq!(config.cache.backend, CacheBackendKind::Redis);
        assert_eq!(config.cache.redis_url, "redis://cache:6379");
    }

    #[test]
    fn redis_url_is_kept_verbatim() {
        let mut config = LivewatchConfig::default();
        apply_overrides(
            &mut config,
            lookup_from(&[(REDIS_ADDR, "rediss://secure:6380/2")]),
        );
        assert_eq!(config.cache.redis_url, "rediss://secure:6380/2");
    }

    #[test]
    fn bad_interval_is_ignored() {
        let mut config = LivewatchConfig::default();
        apply_overrides(&mut config, lookup_from(&[(POLL_INTERVAL_SECS, "soon")]));
        assert_eq!(config.poller.interval_secs, 300);

        apply_overrides(&mut config, lookup_from(&[(POLL_INTERVAL_SECS, "120")]));
        assert_eq!(config.poller.interval_secs, 120);
    }

    #[test]
    fn missing_variables_leave_config_untouched() {
        let mut config = LivewatchConfig::default();
        apply_overrides(&mut config, lookup_from(&[]));
        assert_eq!(config.cache.backend, CacheBackendKind::Memory);
        assert_eq!(config.store.path, "livewatch.db");
    }
}
