//! External service credentials and endpoints.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Twitch Helix status provider.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TwitchConfig {
    pub client_id: String,
    pub client_secret: String,
    pub api_base: String,
    pub auth_url: String,
    pub request_timeout_secs: u64,
}

impl Default for TwitchConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            api_base: "https://api.twitch.tv/helix".into(),
            auth_url: "https://id.twitch.tv/oauth2/token".into(),
            request_timeout_secs: 30,
        }
    }
}

impl fmt::Debug for TwitchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwitchConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("auth_url", &self.auth_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Discord REST notification sink.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    pub bot_token: String,
    pub api_base: String,
    pub request_timeout_secs: u64,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_base: "https://discord.com/api/v10".into(),
            request_timeout_secs: 15,
        }
    }
}

impl fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("bot_token", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}
