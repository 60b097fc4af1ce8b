//! Domain types shared by the poller, stores, and clients.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

// =============================================================================
// Handle
// =============================================================================

/// Error returned when a string is not a valid broadcaster login.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid handle '{0}': expected 1-25 characters of [A-Za-z0-9_]")]
pub struct InvalidHandle(pub String);

fn handle_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]{1,25}$").expect("static handle regex"))
}

/// A broadcaster login. Comparison and hashing ignore ASCII case; the
/// original spelling is kept for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Handle {
    display: String,
    key: String,
}

impl Handle {
    pub fn parse(raw: &str) -> Result<Self, InvalidHandle> {
        let trimmed = raw.trim();
        if !handle_pattern().is_match(trimmed) {
            return Err(InvalidHandle(raw.to_string()));
        }
        Ok(Self {
            display: trimmed.to_string(),
            key: trimmed.to_ascii_lowercase(),
        })
    }

    /// The handle as it was written.
    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// Lowercase form used for lookups and storage keys.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Handle {}

impl Hash for Handle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl TryFrom<String> for Handle {
    type Error = InvalidHandle;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Handle> for String {
    fn from(handle: Handle) -> Self {
        handle.display
    }
}

// =============================================================================
// Entities and records
// =============================================================================

/// A broadcaster linked to an owner account inside a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedEntity {
    /// Stable identifier of the linked owner account.
    pub owner_id: String,
    pub owner_name: String,
    pub handle: Handle,
    pub group_id: String,
    pub active: bool,
}

/// A live stream as reported by the status provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveStatus {
    pub handle: Handle,
    pub viewer_count: u32,
    pub category: String,
    pub title: String,
    pub started_at: Option<DateTime<Utc>>,
}

/// One poll result for a single handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub is_live: bool,
    pub viewer_count: u32,
    pub category: String,
    pub title: String,
}

impl Observation {
    /// An offline observation; all stream fields are zeroed.
    pub fn offline() -> Self {
        Self {
            is_live: false,
            viewer_count: 0,
            category: String::new(),
            title: String::new(),
        }
    }

    pub fn live(viewer_count: u32, category: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            is_live: true,
            viewer_count,
            category: category.into(),
            title: title.into(),
        }
    }
}

impl From<&LiveStatus> for Observation {
    fn from(status: &LiveStatus) -> Self {
        Self::live(status.viewer_count, status.category.clone(), status.title.clone())
    }
}

/// Durable last-known state of a handle. Overwritten on every poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceRecord {
    pub handle: Handle,
    pub is_live: bool,
    pub viewer_count: u32,
    pub category: String,
    pub title: String,
    pub last_checked: DateTime<Utc>,
    pub owner_id: Option<String>,
}

impl PresenceRecord {
    pub fn from_observation(
        handle: Handle,
        observation: &Observation,
        owner_id: Option<String>,
        last_checked: DateTime<Utc>,
    ) -> Self {
        Self {
            handle,
            is_live: observation.is_live,
            viewer_count: observation.viewer_count,
            category: observation.category.clone(),
            title: observation.title.clone(),
            last_checked,
            owner_id,
        }
    }
}

/// Volatile cache value for a handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub handle: String,
    pub is_live: bool,
    pub last_seen: DateTime<Utc>,
}

/// A destination that receives going-live notifications for a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationChannel {
    pub group_id: String,
    pub destination_id: String,
    pub active: bool,
}

/// Emitted once per offline -> live edge of a linked entity. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub handle: Handle,
    pub owner_id: String,
    pub owner_name: String,
    pub group_id: String,
    pub viewer_count: u32,
    pub category: String,
    pub title: String,
    pub observed_at: DateTime<Utc>,
}
