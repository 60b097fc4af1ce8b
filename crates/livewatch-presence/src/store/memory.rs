//! In-process implementation of the store capabilities.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use livewatch_common::{
    Handle, NotificationChannel, PresenceRecord, StoreError, TrackedEntity,
};
use tokio::sync::RwLock;

use super::{ChannelRegistry, EntityRegistry, PresenceStore};

/// Non-durable store. Cloning shares the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<HashMap<Handle, PresenceRecord>>>,
    /// Keyed by owner id.
    entities: Arc<RwLock<HashMap<String, TrackedEntity>>>,
    channels: Arc<RwLock<Vec<NotificationChannel>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every channel row for a group, active or not.
    pub async fn channels_for(&self, group_id: &str) -> Vec<NotificationChannel> {
        self.channels
            .read()
            .await
            .iter()
            .filter(|c| c.group_id == group_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PresenceStore for MemoryStore {
    async fn get(&self, handle: &Handle) -> Result<Option<PresenceRecord>, StoreError> {
        Ok(self.records.read().await.get(handle).cloned())
    }

    async fn put(&self, record: &PresenceRecord) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert(record.handle.clone(), record.clone());
        Ok(())
    }
}

#[async_trait]
impl EntityRegistry for MemoryStore {
    async fn active_entities(&self) -> Result<Vec<TrackedEntity>, StoreError> {
        let mut entities: Vec<TrackedEntity> = self
            .entities
            .read()
            .await
            .values()
            .filter(|e| e.active)
            .cloned()
            .collect();
        entities.sort_by(|a, b| a.handle.key().cmp(b.handle.key()));
        Ok(entities)
    }

    async fn entity_by_handle(
        &self,
        handle: &Handle,
    ) -> Result<Option<TrackedEntity>, StoreError> {
        Ok(self
            .entities
            .read()
            .await
            .values()
            .find(|e| &e.handle == handle)
            .cloned())
    }

    async fn link(&self, entity: &TrackedEntity) -> Result<(), StoreError> {
        self.entities
            .write()
            .await
            .insert(entity.owner_id.clone(), entity.clone());
        Ok(())
    }

    async fn unlink(&self, owner_id: &str) -> Result<bool, StoreError> {
        Ok(self.entities.write().await.remove(owner_id).is_some())
    }

    async fn entities_in_group(&self, group_id: &str) -> Result<Vec<TrackedEntity>, StoreError> {
        Ok(self
            .active_entities()
            .await?
            .into_iter()
            .filter(|e| e.group_id == group_id)
            .collect())
    }
}

#[async_trait]
impl ChannelRegistry for MemoryStore {
    async fn active_channels(
        &self,
        group_id: &str,
    ) -> Result<Vec<NotificationChannel>, StoreError> {
        Ok(self
            .channels
            .read()
            .await
            .iter()
            .filter(|c| c.group_id == group_id && c.active)
            .cloned()
            .collect())
    }

    async fn set_active_channel(
        &self,
        group_id: &str,
        destination_id: &str,
    ) -> Result<(), StoreError> {
        // One write guard covers deactivate + activate.
        let mut channels = self.channels.write().await;
        let mut found = false;
        for channel in channels.iter_mut().filter(|c| c.group_id == group_id) {
            channel.active = channel.destination_id == destination_id;
            found |= channel.active;
        }
        if !found {
            channels.push(NotificationChannel {
                group_id: group_id.to_string(),
                destination_id: destination_id.to_string(),
                active: true,
            });
        }
        Ok(())
    }
}
