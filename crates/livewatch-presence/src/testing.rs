//! Test doubles for the pipeline's external capabilities.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use livewatch_common::{
    CacheError, DispatchError, Handle, LiveNotification, LiveStatus, NotificationChannel,
    PresenceRecord, ProviderError, StoreError, TrackedEntity,
};

use crate::cache::{CacheBackend, MemoryCache};
use crate::provider::StatusProvider;
use crate::sink::NotificationSink;
use crate::store::{ChannelRegistry, MemoryStore, PresenceStore};

pub(crate) fn entity(owner_id: &str, handle: &str, group_id: &str) -> TrackedEntity {
    TrackedEntity {
        owner_id: owner_id.to_string(),
        owner_name: format!("Owner {owner_id}"),
        handle: Handle::parse(handle).unwrap(),
        group_id: group_id.to_string(),
        active: true,
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Provider whose world state and failures are set by the test.
#[derive(Default)]
pub(crate) struct ScriptedProvider {
    live: Mutex<HashMap<Handle, LiveStatus>>,
    query_failures: Mutex<VecDeque<ProviderError>>,
    /// Failures pinned to a specific call number, counted from zero.
    pinned_failures: Mutex<HashMap<usize, ProviderError>>,
    auth_failures: Mutex<VecDeque<ProviderError>>,
    auth_calls: Mutex<usize>,
    query_sizes: Mutex<Vec<usize>>,
    delay: Mutex<Option<Duration>>,
}

impl ScriptedProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_live(&self, handle: &str, viewers: u32, category: &str, title: &str) {
        let handle = Handle::parse(handle).unwrap();
        self.live.lock().unwrap().insert(
            handle.clone(),
            LiveStatus {
                handle,
                viewer_count: viewers,
                category: category.to_string(),
                title: title.to_string(),
                started_at: None,
            },
        );
    }

    pub(crate) fn set_offline(&self, handle: &str) {
        self.live
            .lock()
            .unwrap()
            .remove(&Handle::parse(handle).unwrap());
    }

    /// Fail the next `batch_query` call with `err`. Queued in order.
    pub(crate) fn fail_next(&self, err: ProviderError) {
        self.query_failures.lock().unwrap().push_back(err);
    }

    /// Fail the `call`-th `batch_query` (zero-based, over the provider's
    /// lifetime) with `err`.
    pub(crate) fn fail_call(&self, call: usize, err: ProviderError) {
        self.pinned_failures.lock().unwrap().insert(call, err);
    }

    pub(crate) fn fail_auth(&self, err: ProviderError) {
        self.auth_failures.lock().unwrap().push_back(err);
    }

    pub(crate) fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub(crate) fn auth_calls(&self) -> usize {
        *self.auth_calls.lock().unwrap()
    }

    /// Sizes of every batch the provider was asked for, in call order.
    pub(crate) fn query_sizes(&self) -> Vec<usize> {
        self.query_sizes.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusProvider for ScriptedProvider {
    async fn authenticate(&self) -> Result<(), ProviderError> {
        *self.auth_calls.lock().unwrap() += 1;
        match self.auth_failures.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn batch_query(&self, handles: &[Handle]) -> Result<Vec<LiveStatus>, ProviderError> {
        let call = {
            let mut sizes = self.query_sizes.lock().unwrap();
            sizes.push(handles.len());
            sizes.len() - 1
        };
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.pinned_failures.lock().unwrap().remove(&call) {
            return Err(err);
        }
        if let Some(err) = self.query_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        let live = self.live.lock().unwrap();
        Ok(handles
            .iter()
            .filter_map(|h| live.get(h).cloned())
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

/// Records every delivered notification; chosen destinations fail.
#[derive(Default)]
pub(crate) struct RecordingSink {
    delivered: Mutex<Vec<(String, LiveNotification)>>,
    attempts: Mutex<usize>,
    failing: Mutex<HashSet<String>>,
    delay: Mutex<Option<Duration>>,
}

impl RecordingSink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_destination(&self, destination_id: &str) {
        self.failing
            .lock()
            .unwrap()
            .insert(destination_id.to_string());
    }

    pub(crate) fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub(crate) fn delivered(&self) -> Vec<(String, LiveNotification)> {
        self.delivered.lock().unwrap().clone()
    }

    pub(crate) fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(
        &self,
        destination_id: &str,
        notification: &LiveNotification,
    ) -> Result<(), DispatchError> {
        *self.attempts.lock().unwrap() += 1;
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(destination_id) {
            return Err(DispatchError::Rejected {
                status: 403,
                body: "Missing Access".into(),
            });
        }
        self.delivered
            .lock()
            .unwrap()
            .push((destination_id.to_string(), notification.clone()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// A cache backend that is always down.
pub(crate) struct FailingCache;

#[async_trait]
impl CacheBackend for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Backend("connection refused".into()))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Backend("connection refused".into()))
    }

    async fn expire(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Backend("connection refused".into()))
    }
}

/// In-memory cache whose writes can be switched to fail; reads keep working.
#[derive(Default)]
pub(crate) struct WriteFailingCache {
    inner: MemoryCache,
    failing: AtomicBool,
}

impl WriteFailingCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.failing.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), CacheError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CacheError::Backend("READONLY replica".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheBackend for WriteFailingCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.check()?;
        self.inner.set(key, value, ttl).await
    }

    async fn expire(&self, key: &str) -> Result<(), CacheError> {
        self.check()?;
        self.inner.expire(key).await
    }
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

/// Presence store whose writes fail for selected handles.
#[derive(Clone, Default)]
pub(crate) struct FlakyStore {
    pub(crate) inner: MemoryStore,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl FlakyStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_puts_for(&self, handle: &str) {
        self.failing
            .lock()
            .unwrap()
            .insert(handle.to_ascii_lowercase());
    }

    pub(crate) fn heal(&self) {
        self.failing.lock().unwrap().clear();
    }
}

#[async_trait]
impl PresenceStore for FlakyStore {
    async fn get(&self, handle: &Handle) -> Result<Option<PresenceRecord>, StoreError> {
        self.inner.get(handle).await
    }

    async fn put(&self, record: &PresenceRecord) -> Result<(), StoreError> {
        if self.failing.lock().unwrap().contains(record.handle.key()) {
            return Err(StoreError::Backend("database is locked".into()));
        }
        self.inner.put(record).await
    }
}

/// Fixed destination list, for fan-out to more than one destination.
pub(crate) struct StaticChannels(pub(crate) Vec<NotificationChannel>);

impl StaticChannels {
    pub(crate) fn active(group_id: &str, destinations: &[&str]) -> Self {
        Self(
            destinations
                .iter()
                .map(|d| NotificationChannel {
                    group_id: group_id.to_string(),
                    destination_id: d.to_string(),
                    active: true,
                })
                .collect(),
        )
    }
}

#[async_trait]
impl ChannelRegistry for StaticChannels {
    async fn active_channels(
        &self,
        group_id: &str,
    ) -> Result<Vec<NotificationChannel>, StoreError> {
        Ok(self
            .0
            .iter()
            .filter(|c| c.group_id == group_id && c.active)
            .cloned()
            .collect())
    }

    async fn set_active_channel(
        &self,
        _group_id: &str,
        _destination_id: &str,
    ) -> Result<(), StoreError> {
        Err(StoreError::Backend("read-only".into()))
    }
}
