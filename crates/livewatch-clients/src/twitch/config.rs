//! Twitch client configuration.

use std::fmt;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.twitch.tv/helix";
pub const DEFAULT_AUTH_URL: &str = "https://id.twitch.tv/oauth2/token";

#[derive(Clone)]
pub struct TwitchClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub api_base: String,
    pub auth_url: String,
    pub request_timeout: Duration,
}

impl fmt::Debug for TwitchClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwitchClientConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("auth_url", &self.auth_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl TwitchClientConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// `<api_base>/streams`, tolerating a trailing slash on the base.
    pub(crate) fn streams_url(&self) -> String {
        format!("{}/streams", self.api_base.trim_end_matches('/'))
    }
}
