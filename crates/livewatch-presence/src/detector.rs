//! Edge detection against reconciled prior state.
//!
//! Each handle is a two-state machine (offline, live). A cached `live` is
//! trusted; anything else (a cached `offline`, a miss, a cache error) is
//! checked against the durable store. A stale or flushed cache therefore
//! never causes a duplicate alert for a stream that was already live.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use livewatch_common::{
    Handle, Observation, PresenceRecord, StoreError, TrackedEntity, TransitionEvent,
};
use tracing::debug;

use crate::cache::PresenceCache;
use crate::store::{EntityRegistry, PresenceStore};

/// Result of reconciling one observation.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Offline -> live for a handle with a linked owner.
    WentLive(TransitionEvent),
    /// Offline -> live for a handle nobody active owns. Recorded, not announced.
    WentLiveUnlinked,
    StillLive,
    WentOffline,
    StillOffline,
}

impl Transition {
    pub fn is_rising_edge(&self) -> bool {
        matches!(self, Self::WentLive(_))
    }
}

#[derive(Clone)]
pub struct TransitionDetector {
    cache: PresenceCache,
    store: Arc<dyn PresenceStore>,
    registry: Arc<dyn EntityRegistry>,
}

impl TransitionDetector {
    pub fn new(
        cache: PresenceCache,
        store: Arc<dyn PresenceStore>,
        registry: Arc<dyn EntityRegistry>,
    ) -> Self {
        Self {
            cache,
            store,
            registry,
        }
    }

    /// Reconcile a new observation for `handle` and persist it.
    ///
    /// The store write happens for every observation, linked or not. If it
    /// fails nothing else is touched: the cache keeps its old value and no
    /// transition is reported, so the edge is evaluated again next tick.
    pub async fn observe(
        &self,
        handle: &Handle,
        observation: &Observation,
        observed_at: DateTime<Utc>,
    ) -> Result<Transition, StoreError> {
        let was_live = self.was_live(handle).await?;
        let owner = self
            .registry
            .entity_by_handle(handle)
            .await?
            .filter(|e| e.active && !e.owner_id.is_empty());

        let record = PresenceRecord::from_observation(
            handle.clone(),
            observation,
            owner.as_ref().map(|e| e.owner_id.clone()),
            observed_at,
        );
        self.store.put(&record).await?;
        self.cache.set(handle, observation.is_live).await;

        Ok(classify(was_live, observation, owner, handle, observed_at))
    }

    /// Prior live state. Only a cached `live` short-circuits the store read.
    async fn was_live(&self, handle: &Handle) -> Result<bool, StoreError> {
        let cached = self.cache.get(handle).await;
        if cached == Some(true) {
            return Ok(true);
        }
        let stored = self.store.get(handle).await?;
        debug!(
            handle = %handle,
            cached = ?cached,
            found = stored.is_some(),
            "read prior state from store"
        );
        Ok(stored.is_some_and(|r| r.is_live))
    }
}

fn classify(
    was_live: bool,
    observation: &Observation,
    owner: Option<TrackedEntity>,
    handle: &Handle,
    observed_at: DateTime<Utc>,
) -> Transition {
    match (was_live, observation.is_live) {
        (false, true) => match owner {
            Some(entity) => Transition::WentLive(TransitionEvent {
                handle: handle.clone(),
                owner_id: entity.owner_id,
                owner_name: entity.owner_name,
                group_id: entity.group_id,
                viewer_count: observation.viewer_count,
                category: observation.category.clone(),
                title: observation.title.clone(),
                observed_at,
            }),
            None => {
                debug!(handle = %handle, "went live without a linked owner, not notifying");
                Transition::WentLiveUnlinked
            }
        },
        (true, true) => Transition::StillLive,
        (true, false) => Transition::WentOffline,
        (false, false) => Transition::StillOffline,
    }
}
