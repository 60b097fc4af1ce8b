//! Twitch Helix status provider.
//!
//! Uses an app access token from the client-credentials flow and the
//! `GET /streams` endpoint with repeated `user_login` parameters (up to 100
//! per call). A 401 on a query surfaces as `ProviderError::AuthExpired` so
//! the poller can refresh the token and retry once.

mod api;
mod client;
mod config;

pub use client::TwitchClient;
pub use config::TwitchClientConfig;
