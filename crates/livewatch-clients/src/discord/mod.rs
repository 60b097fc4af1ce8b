//! Discord REST notification sink.
//!
//! Posts one message with a single embed to `POST /channels/{id}/messages`
//! using bot authentication.

mod api;
mod client;
mod config;

pub use client::DiscordClient;
pub use config::DiscordClientConfig;
