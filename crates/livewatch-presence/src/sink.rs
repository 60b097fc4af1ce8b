use async_trait::async_trait;
use livewatch_common::{DispatchError, LiveNotification};

/// A destination platform that can post a going-live notification.
///
/// One call is one delivery attempt; the dispatcher never retries.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(
        &self,
        destination_id: &str,
        notification: &LiveNotification,
    ) -> Result<(), DispatchError>;
}
