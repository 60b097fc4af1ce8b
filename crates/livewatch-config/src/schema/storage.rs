//! Cache and durable store configuration types.

use serde::{Deserialize, Serialize};

/// Which cache backend holds the volatile presence state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum CacheBackendKind {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackendKind,
    pub redis_url: String,
    /// Entry lifetime in seconds (valid range: 60-604800).
    pub ttl_secs: u64,
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackendKind::Memory,
            redis_url: "redis://127.0.0.1:6379/0".into(),
            ttl_secs: 24 * 60 * 60,
            key_prefix: "livewatch:presence:".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file.
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "livewatch.db".into(),
        }
    }
}
