//! Structured going-live notification payload.
//!
//! One payload is built per transition and handed unchanged to every
//! destination; sinks decide how to render it on their platform.

use serde::{Deserialize, Serialize};

use crate::types::TransitionEvent;

/// Canonical channel link prefix.
pub const CHANNEL_URL_BASE: &str = "https://twitch.tv";

/// Preview image template; `{login}` is replaced with the lowercase handle.
pub const PREVIEW_URL_TEMPLATE: &str =
    "https://static-cdn.jtvnw.net/previews-ttv/live_user_{login}-320x180.jpg";

/// Default accent colour (Twitch purple).
pub const DEFAULT_ACCENT_COLOR: u32 = 0x9146FF;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveNotification {
    pub title: String,
    pub description: String,
    pub url: String,
    pub handle: String,
    pub category: String,
    pub viewer_count: u32,
    pub thumbnail_url: String,
    /// RFC 3339 time the transition was observed.
    pub timestamp: String,
    pub footer: String,
    pub color: u32,
}

impl LiveNotification {
    /// Build the payload for a going-live transition.
    pub fn going_live(event: &TransitionEvent, footer: &str, color: u32) -> Self {
        let name = if event.owner_name.is_empty() {
            event.handle.as_str()
        } else {
            event.owner_name.as_str()
        };
        Self {
            title: format!("🔴 {name} is now LIVE!"),
            description: event.title.clone(),
            url: channel_url(event.handle.as_str()),
            handle: event.handle.as_str().to_string(),
            category: event.category.clone(),
            viewer_count: event.viewer_count,
            thumbnail_url: preview_url(event.handle.key()),
            timestamp: event.observed_at.to_rfc3339(),
            footer: footer.to_string(),
            color,
        }
    }
}

pub fn channel_url(handle: &str) -> String {
    format!("{CHANNEL_URL_BASE}/{handle}")
}

pub fn preview_url(handle: &str) -> String {
    PREVIEW_URL_TEMPLATE.replace("{login}", &handle.to_ascii_lowercase())
}
