//! Live-status provider capability.

use async_trait::async_trait;
use livewatch_common::{Handle, LiveStatus, ProviderError};
use tracing::{info, warn};

/// Batched live-status lookup against an external streaming platform.
#[async_trait]
pub trait StatusProvider: Send + Sync {
    /// Obtain (or refresh) the access token used by [`batch_query`].
    ///
    /// [`batch_query`]: StatusProvider::batch_query
    async fn authenticate(&self) -> Result<(), ProviderError>;

    /// Live statuses for the subset of `handles` that are currently live.
    ///
    /// Handles that are offline or unknown are simply absent. Callers pass at
    /// most [`StatusProvider::max_batch`] handles.
    async fn batch_query(&self, handles: &[Handle]) -> Result<Vec<LiveStatus>, ProviderError>;

    /// Largest batch the provider accepts in one call.
    fn max_batch(&self) -> usize {
        100
    }
}

/// Query one batch, re-authenticating once if the token expired.
///
/// A second `AuthExpired` on the retried batch is reported as transient so
/// the tick is abandoned and retried on the next schedule.
pub async fn query_with_reauth(
    provider: &dyn StatusProvider,
    handles: &[Handle],
) -> Result<Vec<LiveStatus>, ProviderError> {
    match provider.batch_query(handles).await {
        Err(ProviderError::AuthExpired) => {
            info!("provider token expired, re-authenticating");
            provider.authenticate().await?;
            match provider.batch_query(handles).await {
                Err(ProviderError::AuthExpired) => {
                    warn!("provider rejected refreshed token");
                    Err(ProviderError::Transient(
                        "token expired again after re-authentication".into(),
                    ))
                }
                other => other,
            }
        }
        other => other,
    }
}
