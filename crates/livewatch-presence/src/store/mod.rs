//! Durable state capabilities consumed by the pipeline.
//!
//! Three owned components, passed in at construction time:
//! - [`PresenceStore`]: last-known presence per handle, authoritative.
//! - [`EntityRegistry`]: which handles are tracked and who owns them.
//! - [`ChannelRegistry`]: where each group's notifications go.

mod memory;


pub use memory::MemoryStore;

use async_trait::async_trait;
use livewatch_common::{
    Handle, NotificationChannel, PresenceRecord, StoreError, TrackedEntity,
};

/// Last-known presence per handle. Full replace, last write wins.
#[async_trait]
pub trait PresenceStore: Send + Sync {
    async fn get(&self, handle: &Handle) -> Result<Option<PresenceRecord>, StoreError>;

    async fn put(&self, record: &PresenceRecord) -> Result<(), StoreError>;
}

/// Tracked broadcasters and their linked owners.
#[async_trait]
pub trait EntityRegistry: Send + Sync {
    /// Every entity with `active = true`.
    async fn active_entities(&self) -> Result<Vec<TrackedEntity>, StoreError>;

    /// The entity currently linked to `handle`, if any.
    async fn entity_by_handle(&self, handle: &Handle)
        -> Result<Option<TrackedEntity>, StoreError>;

    /// Insert or replace the entity for `entity.owner_id`.
    async fn link(&self, entity: &TrackedEntity) -> Result<(), StoreError>;

    /// Remove the owner's entity. Returns `false` if nothing was linked.
    async fn unlink(&self, owner_id: &str) -> Result<bool, StoreError>;

    /// Active entities whose owner belongs to `group_id`.
    async fn entities_in_group(&self, group_id: &str) -> Result<Vec<TrackedEntity>, StoreError>;
}

/// Notification destinations per group.
#[async_trait]
pub trait ChannelRegistry: Send + Sync {
    /// Active destinations for `group_id`; zero or one in practice.
    async fn active_channels(&self, group_id: &str)
        -> Result<Vec<NotificationChannel>, StoreError>;

    /// Make `destination_id` the only active destination for `group_id`.
    ///
    /// Implementations deactivate every other destination of the group and
    /// activate this one atomically.
    async fn set_active_channel(
        &self,
        group_id: &str,
        destination_id: &str,
    ) -> Result<(), StoreError>;
}

/// Live entities of a group, joined with their stored presence.
pub async fn live_in_group(
    registry: &dyn EntityRegistry,
    store: &dyn PresenceStore,
    group_id: &str,
) -> Result<Vec<(TrackedEntity, PresenceRecord)>, StoreError> {
    let mut live = Vec::new();
    for entity in registry.entities_in_group(group_id).await? {
        if let Some(record) = store.get(&entity.handle).await? {
            if record.is_live {
                live.push((entity, record));
            }
        }
    }
    live.sort_by(|a, b| b.1.viewer_count.cmp(&a.1.viewer_count));
    Ok(live)
}
