//! Per-section validation: poller, dispatch, cache.

use crate::schema::{CacheBackendKind, LivewatchConfig, MAX_BATCH_SIZE};

use super::helpers::validate_range;

/// Validate poll scheduling constraints.
pub(crate) fn validate_poller(errors: &mut Vec<String>, config: &LivewatchConfig) {
    validate_range(
        errors,
        "poller.interval_secs",
        config.poller.interval_secs,
        60,
        86_400,
    );
    validate_range(
        errors,
        "poller.initial_delay_secs",
        config.poller.initial_delay_secs,
        0,
        3_600,
    );
    validate_range(
        errors,
        "poller.batch_size",
        u64::from(config.poller.batch_size),
        1,
        u64::from(MAX_BATCH_SIZE),
    );
    validate_range(
        errors,
        "poller.shutdown_timeout_secs",
        config.poller.shutdown_timeout_secs,
        1,
        300,
    );
}

/// Validate dispatch constraints.
pub(crate) fn validate_dispatch(errors: &mut Vec<String>, config: &LivewatchConfig) {
    validate_range(
        errors,
        "dispatch.max_in_flight",
        u64::from(config.dispatch.max_in_flight),
        1,
        4_096,
    );
    validate_range(
        errors,
        "dispatch.drain_timeout_secs",
        config.dispatch.drain_timeout_secs,
        1,
        300,
    );
    if config.dispatch.accent_color > 0xFF_FF_FF {
        errors.push(format!(
            "dispatch.accent_color = {:#x} is not a 24-bit RGB value",
            config.dispatch.accent_color
        ));
    }
}

/// Validate cache constraints.
pub(crate) fn validate_cache(errors: &mut Vec<String>, config: &LivewatchConfig) {
    validate_range(
        errors,
        "cache.ttl_secs",
        config.cache.ttl_secs,
        60,
        604_800,
    );
    if config.cache.backend == CacheBackendKind::Redis {
        let url = config.cache.redis_url.as_str();
        if !(url.starts_with("redis://") || url.starts_with("rediss://")) {
            errors.push(format!(
                "cache.redis_url = '{url}' must start with redis:// or rediss://"
            ));
        }
    }
}

/// Validate the durable store location.
pub(crate) fn validate_store(errors: &mut Vec<String>, config: &LivewatchConfig) {
    if config.store.path.trim().is_empty() {
        errors.push("store.path must not be empty".into());
    }
}
