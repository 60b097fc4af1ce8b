//! Volatile, TTL-bounded last-known live state.
//!
//! The cache only ever short-circuits the durable store lookup. Any backend
//! failure is reported to the caller as a miss.

mod memory;
#[cfg(feature = "redis-cache")]
mod redis_backend;


pub use memory::MemoryCache;
#[cfg(feature = "redis-cache")]
pub use redis_backend::RedisCache;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use livewatch_common::{CacheEntry, CacheError, Handle};
use tracing::debug;

/// Default time a cached state stays valid after it was written.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default key namespace.
pub const DEFAULT_KEY_PREFIX: &str = "livewatch:presence:";

// ---------------------------------------------------------------------------
// Backend capability
// ---------------------------------------------------------------------------

/// String key/value storage with per-key expiry.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value`, replacing any previous value and resetting its expiry.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Drop `key` immediately.
    async fn expire(&self, key: &str) -> Result<(), CacheError>;
}

// ---------------------------------------------------------------------------
// PresenceCache
// ---------------------------------------------------------------------------

/// Typed view over a [`CacheBackend`] keyed by handle.
#[derive(Clone)]
pub struct PresenceCache {
    backend: Arc<dyn CacheBackend>,
    ttl: Duration,
    key_prefix: String,
}

impl PresenceCache {
    pub fn new(backend: Arc<dyn CacheBackend>, ttl: Duration, key_prefix: impl Into<String>) -> Self {
        Self {
            backend,
            ttl,
            key_prefix: key_prefix.into(),
        }
    }

    /// In-memory cache with the default TTL and prefix.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCache::new()), DEFAULT_TTL, DEFAULT_KEY_PREFIX)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn key_for(&self, handle: &Handle) -> String {
        format!("{}{}", self.key_prefix, handle.key())
    }

    /// Last cached live state, or `None` on a miss.
    ///
    /// Backend and decode errors are logged and treated as a miss.
    pub async fn get(&self, handle: &Handle) -> Option<bool> {
        let key = self.key_for(handle);
        let raw = match self.backend.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                debug!(handle = %handle, error = %e, "cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str::<CacheEntry>(&raw) {
            Ok(entry) => Some(entry.is_live),
            Err(e) => {
                debug!(handle = %handle, error = %e, "undecodable cache entry, treating as miss");
                None
            }
        }
    }

    /// Record the current live state. Best-effort: failures are logged only.
    pub async fn set(&self, handle: &Handle, is_live: bool) {
        let entry = CacheEntry {
            handle: handle.key().to_string(),
            is_live,
            last_seen: Utc::now(),
        };
        let value = match serde_json::to_string(&entry) {
            Ok(v) => v,
            Err(e) => {
                debug!(handle = %handle, error = %e, "failed to encode cache entry");
                return;
            }
        };

        if let Err(e) = self.backend.set(&self.key_for(handle), &value, self.ttl).await {
            debug!(handle = %handle, error = %e, "cache write failed");
        }
    }

    /// Forget the cached state for `handle`. Best-effort.
    pub async fn invalidate(&self, handle: &Handle) {
        if let Err(e) = self.backend.expire(&self.key_for(handle)).await {
            debug!(handle = %handle, error = %e, "cache invalidate failed");
        }
    }
}
