//! HTTP clients for the platforms the pipeline talks to.
//!
//! - [`TwitchClient`]: Helix `streams` lookup, implements `StatusProvider`.
//! - [`DiscordClient`]: channel message with an embed, implements
//!   `NotificationSink`.

pub mod discord;
pub mod twitch;

pub use discord::{DiscordClient, DiscordClientConfig};
pub use twitch::{TwitchClient, TwitchClientConfig};

/// Keep error bodies short enough for a log line.
pub(crate) fn truncate_body(text: &str) -> String {
    text.chars().take(200).collect()
}
