//! Timer-driven presence poller.
//!
//! One tick loads the active entities, asks the provider about all of them
//! in batches, and feeds every entity's observation through the
//! [`TransitionDetector`]. Rising edges are handed to the
//! [`NotificationDispatcher`] without waiting for delivery.
//!
//! Ticks are single-flight: a tick requested while another is running is
//! dropped, never queued.

mod flight;


use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::FutureExt;
use livewatch_common::{
    new_correlation_id, Event, EventBus, Handle, LiveStatus, LivewatchError, Observation,
    ProviderError,
};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::detector::{Transition, TransitionDetector};
use crate::dispatcher::NotificationDispatcher;
use crate::provider::{query_with_reauth, StatusProvider};
use crate::store::EntityRegistry;

use flight::{PollerState, SingleFlight};

// ---------------------------------------------------------------------------
// Settings and outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PollerSettings {
    pub interval: Duration,
    /// Delay before the first tick after startup.
    pub initial_delay: Duration,
    /// Handles per provider call; capped at the provider's own limit.
    pub batch_size: usize,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            initial_delay: Duration::from_secs(10),
            batch_size: 100,
        }
    }
}

/// Counters for one completed tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub tick_id: String,
    /// Distinct handles checked.
    pub checked: usize,
    /// Handles the provider reported live.
    pub live: usize,
    pub went_live: usize,
    pub went_offline: usize,
    /// Handles whose state could not be recorded.
    pub failed: usize,
}

#[derive(Debug)]
pub enum TickOutcome {
    /// Another tick was already running.
    Skipped,
    /// Nothing is being tracked.
    NoEntities,
    Completed(TickSummary),
    /// The tick was abandoned before any entity was updated.
    Aborted {
        tick_id: String,
        error: LivewatchError,
    },
}

// ---------------------------------------------------------------------------
// Poller
// ---------------------------------------------------------------------------

pub struct PresencePoller {
    registry: Arc<dyn EntityRegistry>,
    provider: Arc<dyn StatusProvider>,
    detector: TransitionDetector,
    dispatcher: NotificationDispatcher,
    events: Arc<EventBus>,
    settings: PollerSettings,
    flight: SingleFlight,
    manual: Notify,
}

impl PresencePoller {
    pub fn new(
        registry: Arc<dyn EntityRegistry>,
        provider: Arc<dyn StatusProvider>,
        detector: TransitionDetector,
        dispatcher: NotificationDispatcher,
        events: Arc<EventBus>,
        settings: PollerSettings,
    ) -> Self {
        Self {
            registry,
            provider,
            detector,
            dispatcher,
            events,
            settings,
            flight: SingleFlight::new(),
            manual: Notify::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.flight.state() == PollerState::Running
    }

    /// Ask the scheduled loop for an extra tick.
    ///
    /// Returns `false` (and does nothing) if a tick is in flight. A request
    /// that coincides with a scheduled tick is absorbed by it, never queued
    /// behind it.
    pub fn request_tick(&self) -> bool {
        if self.is_running() {
            debug!("tick in flight, manual request dropped");
            return false;
        }
        self.manual.notify_one();
        true
    }

    /// Run one tick now, unless one is already running.
    pub async fn run_tick(&self) -> TickOutcome {
        let Some(_guard) = self.flight.try_begin() else {
            debug!("tick already running, skipping");
            return TickOutcome::Skipped;
        };
        let tick_id = new_correlation_id();
        let span = info_span!("tick", tick_id = %tick_id);
        self.tick(tick_id).instrument(span).await
    }

    async fn tick(&self, tick_id: String) -> TickOutcome {
        let entities = match self.registry.active_entities().await {
            Ok(entities) => entities,
            Err(e) => {
                error!(error = %e, "failed to load tracked entities");
                return self.abort(tick_id, e.into());
            }
        };
        if entities.is_empty() {
            info!("no active entities to check");
            return TickOutcome::NoEntities;
        }

        let mut seen = HashSet::with_capacity(entities.len());
        let handles: Vec<Handle> = entities
            .into_iter()
            .map(|e| e.handle)
            .filter(|h| seen.insert(h.clone()))
            .collect();

        let live = match self.fetch_live(&handles).await {
            Ok(live) => live,
            Err(e) => {
                warn!(error = %e, "status query failed, abandoning tick");
                return self.abort(tick_id, e.into());
            }
        };

        let observed_at = Utc::now();
        let mut summary = TickSummary {
            tick_id,
            checked: handles.len(),
            ..TickSummary::default()
        };

        for handle in &handles {
            let observation = live
                .get(handle)
                .map(Observation::from)
                .unwrap_or_else(Observation::offline);
            if observation.is_live {
                summary.live += 1;
            }

            match self.detector.observe(handle, &observation, observed_at).await {
                Ok(Transition::WentLive(event)) => {
                    info!(
                        handle = %handle,
                        group = %event.group_id,
                        viewers = event.viewer_count,
                        category = %event.category,
                        "went live"
                    );
                    summary.went_live += 1;
                    self.events.publish(Event::WentLive(event.clone()));
                    self.dispatcher.dispatch(event);
                }
                Ok(Transition::WentOffline) => {
                    debug!(handle = %handle, "went offline");
                    summary.went_offline += 1;
                    self.events.publish(Event::WentOffline {
                        handle: handle.clone(),
                    });
                }
                Ok(Transition::WentLiveUnlinked) => {
                    debug!(handle = %handle, "live, no linked owner");
                }
                Ok(Transition::StillLive) => {
                    debug!(handle = %handle, viewers = observation.viewer_count, "still live");
                }
                Ok(Transition::StillOffline) => {
                    debug!(handle = %handle, "offline");
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!(handle = %handle, error = %e, "failed to record presence");
                }
            }
        }

        info!(
            checked = summary.checked,
            live = summary.live,
            went_live = summary.went_live,
            failed = summary.failed,
            "tick complete"
        );
        self.events.publish(Event::TickCompleted {
            tick_id: summary.tick_id.clone(),
            checked: summary.checked,
            live: summary.live,
            failed: summary.failed,
        });
        TickOutcome::Completed(summary)
    }

    /// Query every chunk. Any failing chunk fails the whole lookup.
    async fn fetch_live(
        &self,
        handles: &[Handle],
    ) -> Result<HashMap<Handle, LiveStatus>, ProviderError> {
        let batch_size = self
            .settings
            .batch_size
            .min(self.provider.max_batch())
            .max(1);

        let mut live = HashMap::new();
        for chunk in handles.chunks(batch_size) {
            for status in query_with_reauth(self.provider.as_ref(), chunk).await? {
                live.insert(status.handle.clone(), status);
            }
        }
        Ok(live)
    }

    fn abort(&self, tick_id: String, error: LivewatchError) -> TickOutcome {
        self.events.publish(Event::TickFailed {
            tick_id: tick_id.clone(),
            reason: error.to_string(),
        });
        TickOutcome::Aborted { tick_id, error }
    }

    // -----------------------------------------------------------------------
    // Schedule
    // -----------------------------------------------------------------------

    /// Run the scheduled loop on its own task until `cancel` fires.
    pub fn spawn(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }

    /// First tick after `initial_delay`, then one every `interval`, plus any
    /// manual requests. No tick starts once `cancel` has fired.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            interval_secs = self.settings.interval.as_secs(),
            initial_delay_secs = self.settings.initial_delay.as_secs(),
            "presence poller started"
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("presence poller stopped before first tick");
                return;
            }
            _ = tokio::time::sleep(self.settings.initial_delay) => {}
        }

        let period = self.settings.interval.max(Duration::from_secs(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    // A request that raced the timer is satisfied by this tick.
                    if self.manual.notified().now_or_never().is_some() {
                        debug!("manual request folded into scheduled tick");
                    }
                }
                _ = self.manual.notified() => {
                    debug!("running manually requested tick");
                }
            }
            self.run_tick().await;
        }
        info!("presence poller stopped");
    }
}
