//! Twitch client struct, token state, and response parsing.

use chrono::{DateTime, Utc};
use livewatch_common::{Handle, LiveStatus, ProviderError};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::truncate_body;

use super::config::TwitchClientConfig;

/// Twitch Helix client.
pub struct TwitchClient {
    pub(crate) config: TwitchClientConfig,
    pub(crate) http: reqwest::Client,
    /// App access token; `None` until the first successful authentication.
    pub(crate) token: RwLock<Option<String>>,
}

impl TwitchClient {
    pub fn new(config: TwitchClientConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ProviderError::Transient(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            config,
            http,
            token: RwLock::new(None),
        })
    }

    pub(crate) async fn current_token(&self) -> Option<String> {
        self.token.read().await.clone()
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    #[serde(default)]
    pub(crate) expires_in: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StreamsResponse {
    #[serde(default)]
    pub(crate) data: Vec<StreamData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StreamData {
    pub(crate) user_login: String,
    #[serde(default)]
    pub(crate) game_name: String,
    #[serde(default)]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) viewer_count: u32,
    #[serde(default)]
    pub(crate) started_at: Option<DateTime<Utc>>,
    /// "live" while broadcasting; empty once the stream has ended.
    #[serde(default, rename = "type")]
    pub(crate) kind: Option<String>,
}

/// Query string for a batch: one `user_login` per handle.
pub(crate) fn streams_query(handles: &[Handle]) -> Vec<(&'static str, String)> {
    let mut query = Vec::with_capacity(handles.len() + 1);
    query.push(("first", handles.len().clamp(1, 100).to_string()));
    query.extend(handles.iter().map(|h| ("user_login", h.key().to_string())));
    query
}

/// Decode a `GET /streams` body into live statuses.
pub(crate) fn parse_streams(body: &str) -> Result<Vec<LiveStatus>, ProviderError> {
    let response: StreamsResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    Ok(response
        .data
        .into_iter()
        .filter(|s| s.kind.as_deref().map_or(true, |k| k == "live"))
        .filter_map(|s| match Handle::parse(&s.user_login) {
            Ok(handle) => Some(LiveStatus {
                handle,
                viewer_count: s.viewer_count,
                category: s.game_name,
                title: s.title,
                started_at: s.started_at,
            }),
            Err(e) => {
                debug!(error = %e, "skipping stream with unusable login");
                None
            }
        })
        .collect())
}

/// Map a non-success status on a streams query to a provider error.
pub(crate) fn classify_query_status(status: reqwest::StatusCode, body: &str) -> ProviderError {
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return ProviderError::AuthExpired;
    }
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return ProviderError::Transient("rate limited".into());
    }
    if status.is_server_error() {
        return ProviderError::Transient(format!("HTTP {status}: {}", truncate_body(body)));
    }
    ProviderError::Rejected {
        status: status.as_u16(),
        body: truncate_body(body),
    }
}
