//! Configuration schema types for Livewatch.
//!
//! All structs use `serde(default)` so partial configs work correctly.
//! Missing fields are filled with the defaults the service ships with.

mod poller;
mod services;
mod storage;
mod system;

pub use poller::*;
pub use services::*;
pub use storage::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for Livewatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct LivewatchConfig {
    pub poller: PollerConfig,
    pub dispatch: DispatchConfig,
    pub cache: CacheConfig,
    pub store: StoreConfig,
    pub twitch: TwitchConfig,
    pub discord: DiscordConfig,
    pub logging: LoggingConfig,
}

impl LivewatchConfig {
    /// Copy of this config with every credential blanked out.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.twitch.client_secret.is_empty() {
            copy.twitch.client_secret = "[REDACTED]".into();
        }
        if !copy.discord.bot_token.is_empty() {
            copy.discord.bot_token = "[REDACTED]".into();
        }
        copy
    }
}

// =============================================================================
// Tests
// =============================================================================
