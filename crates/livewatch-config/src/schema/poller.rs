//! Polling and dispatch configuration types.

use serde::{Deserialize, Serialize};

/// Largest number of handles the status provider accepts in one query.
pub const MAX_BATCH_SIZE: u32 = 100;

/// Poll scheduling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Seconds between ticks (valid range: 60-86400).
    pub interval_secs: u64,
    /// Seconds to wait after startup before the first tick.
    pub initial_delay_secs: u64,
    /// Handles per provider query (1-100).
    pub batch_size: u32,
    /// How long shutdown waits for an in-flight tick.
    pub shutdown_timeout_secs: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_secs: 300,
            initial_delay_secs: 10,
            batch_size: MAX_BATCH_SIZE,
            shutdown_timeout_secs: 10,
        }
    }
}

/// Notification fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Upper bound on outstanding delivery tasks.
    pub max_in_flight: u32,
    /// How long shutdown waits for in-flight deliveries.
    pub drain_timeout_secs: u64,
    pub footer: String,
    pub accent_color: u32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 64,
            drain_timeout_secs: 10,
            footer: "Livewatch Live Notifications".into(),
            accent_color: 0x9146FF,
        }
    }
}
