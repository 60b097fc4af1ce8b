//! StatusProvider implementation for TwitchClient.

use async_trait::async_trait;
use livewatch_common::{Handle, LiveStatus, ProviderError};
use livewatch_presence::StatusProvider;
use tracing::{debug, info};

use crate::truncate_body;

use super::client::{classify_query_status, parse_streams, streams_query, TokenResponse, TwitchClient};

#[async_trait]
impl StatusProvider for TwitchClient {
    async fn authenticate(&self) -> Result<(), ProviderError> {
        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "client_credentials"),
        ];

        let response = self
            .http
            .post(&self.config.auth_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| ProviderError::Transient(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Transient(format!(
                "token endpoint HTTP {status}: {}",
                truncate_body(&text)
            )));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Auth(format!(
                "HTTP {status}: {}",
                truncate_body(&text)
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        info!(expires_in = token.expires_in, "obtained Twitch app access token");
        *self.token.write().await = Some(token.access_token);
        Ok(())
    }

    async fn batch_query(&self, handles: &[Handle]) -> Result<Vec<LiveStatus>, ProviderError> {
        if handles.is_empty() {
            return Ok(Vec::new());
        }
        if handles.len() > self.max_batch() {
            return Err(ProviderError::Rejected {
                status: 400,
                body: format!("batch of {} exceeds limit of {}", handles.len(), self.max_batch()),
            });
        }

        let token = match self.current_token().await {
            Some(token) => token,
            None => {
                self.authenticate().await?;
                self.current_token().await.ok_or(ProviderError::AuthExpired)?
            }
        };

        debug!(count = handles.len(), "Twitch streams request");

        let response = self
            .http
            .get(self.config.streams_url())
            .query(&streams_query(handles))
            .header("Client-Id", &self.config.client_id)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ProviderError::Transient(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Transient(e.to_string()))?;
        if !status.is_success() {
            return Err(classify_query_status(status, &text));
        }

        parse_streams(&text)
    }
}
