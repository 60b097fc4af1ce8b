//! Discord client struct and embed building.

use livewatch_common::{DispatchError, LiveNotification};
use serde_json::json;

use crate::truncate_body;

use super::config::DiscordClientConfig;

/// Discord bot REST client.
pub struct DiscordClient {
    pub(crate) config: DiscordClientConfig,
    pub(crate) http: reqwest::Client,
}

impl DiscordClient {
    pub fn new(config: DiscordClientConfig) -> Result<Self, DispatchError> {
        let http = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DispatchError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    pub(crate) fn auth_header(&self) -> String {
        format!("Bot {}", self.config.bot_token)
    }
}

/// Channel ids are numeric snowflakes.
pub(crate) fn validate_channel_id(channel_id: &str) -> Result<(), DispatchError> {
    if channel_id.is_empty() || !channel_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(DispatchError::Payload(format!(
            "invalid channel id '{channel_id}'"
        )));
    }
    Ok(())
}

/// Message body carrying the notification as a single embed.
pub(crate) fn build_message(notification: &LiveNotification) -> serde_json::Value {
    let category = if notification.category.is_empty() {
        "Unknown"
    } else {
        notification.category.as_str()
    };

    let mut embed = json!({
        "title": notification.title,
        "url": notification.url,
        "color": notification.color,
        "fields": [
            {
                "name": "Twitch Channel",
                "value": format!("[{}]({})", notification.handle, notification.url),
                "inline": true,
            },
            {
                "name": "Game/Category",
                "value": category,
                "inline": true,
            },
            {
                "name": "Viewers",
                "value": notification.viewer_count.to_string(),
                "inline": true,
            },
        ],
        "thumbnail": { "url": notification.thumbnail_url },
        "timestamp": notification.timestamp,
        "footer": { "text": notification.footer },
    });

    // Discord rejects empty descriptions.
    if !notification.description.is_empty() {
        embed["description"] = json!(notification.description);
    }

    json!({ "embeds": [embed] })
}

pub(crate) fn classify_send_status(status: reqwest::StatusCode, body: &str) -> DispatchError {
    DispatchError::Rejected {
        status: status.as_u16(),
        body: truncate_body(body),
    }
}
