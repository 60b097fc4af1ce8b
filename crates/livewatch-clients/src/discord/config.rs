//! Discord client configuration.

use std::fmt;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

#[derive(Clone)]
pub struct DiscordClientConfig {
    pub bot_token: String,
    pub api_base: String,
    pub request_timeout: Duration,
}

impl fmt::Debug for DiscordClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordClientConfig")
            .field("bot_token", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl DiscordClientConfig {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(15),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub(crate) fn messages_url(&self, channel_id: &str) -> String {
        format!(
            "{}/channels/{channel_id}/messages",
            self.api_base.trim_end_matches('/')
        )
    }
}
