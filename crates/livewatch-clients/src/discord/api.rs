//! NotificationSink implementation for DiscordClient.

use async_trait::async_trait;
use livewatch_common::{DispatchError, LiveNotification};
use livewatch_presence::NotificationSink;
use tracing::debug;

use super::client::{build_message, classify_send_status, validate_channel_id, DiscordClient};

#[async_trait]
impl NotificationSink for DiscordClient {
    async fn send(
        &self,
        destination_id: &str,
        notification: &LiveNotification,
    ) -> Result<(), DispatchError> {
        validate_channel_id(destination_id)?;
        let body = build_message(notification);

        debug!(channel = %destination_id, "Discord message request");

        let response = self
            .http
            .post(self.config.messages_url(destination_id))
            .header("Authorization", self.auth_header())
            .json(&body)
            .send()
            .await
            .map_err(|e| DispatchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_send_status(status, &text));
        }
        Ok(())
    }
}
