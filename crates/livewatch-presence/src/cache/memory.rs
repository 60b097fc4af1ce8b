//! Process-local cache backend.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use livewatch_common::CacheError;
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::CacheBackend;

struct Slot {
    value: String,
    expires_at: Instant,
}

/// In-memory backend. Expired keys are dropped lazily on access.
#[derive(Default)]
pub struct MemoryCache {
    slots: RwLock<HashMap<String, Slot>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held, including ones that expired but were
    /// not yet touched.
    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }

    /// Drop every key, as if the backing process had restarted.
    pub async fn clear(&self) {
        self.slots.write().await.clear();
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        {
            let slots = self.slots.read().await;
            match slots.get(key) {
                None => return Ok(None),
                Some(slot) if slot.expires_at > Instant::now() => {
                    return Ok(Some(slot.value.clone()));
                }
                Some(_) => {}
            }
        }

        let mut slots = self.slots.write().await;
        if slots
            .get(key)
            .is_some_and(|slot| slot.expires_at <= Instant::now())
        {
            slots.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let slot = Slot {
            value: value.to_string(),
            expires_at: Instant::now() + ttl,
        };
        self.slots.write().await.insert(key.to_string(), slot);
        Ok(())
    }

    async fn expire(&self, key: &str) -> Result<(), CacheError> {
        self.slots.write().await.remove(key);
        Ok(())
    }
}
