//! Constructor-time wiring of the pipeline and its shutdown sequence.

use std::sync::Arc;
use std::time::Duration;

use livewatch_common::{Event, EventBus};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cache::PresenceCache;
use crate::detector::TransitionDetector;
use crate::dispatcher::{DispatcherSettings, NotificationDispatcher};
use crate::poller::{PollerSettings, PresencePoller, TickOutcome};
use crate::provider::StatusProvider;
use crate::sink::NotificationSink;
use crate::store::{ChannelRegistry, EntityRegistry, PresenceStore};

/// The owned components the pipeline runs on.
pub struct MonitorParts {
    pub cache: PresenceCache,
    pub store: Arc<dyn PresenceStore>,
    pub entities: Arc<dyn EntityRegistry>,
    pub channels: Arc<dyn ChannelRegistry>,
    pub provider: Arc<dyn StatusProvider>,
    pub sink: Arc<dyn NotificationSink>,
}

#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub poller: PollerSettings,
    pub dispatcher: DispatcherSettings,
    /// How long shutdown waits for an in-flight tick.
    pub shutdown_timeout: Duration,
    /// How long shutdown waits for in-flight deliveries.
    pub drain_timeout: Duration,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poller: PollerSettings::default(),
            dispatcher: DispatcherSettings::default(),
            shutdown_timeout: Duration::from_secs(10),
            drain_timeout: Duration::from_secs(10),
        }
    }
}

/// What shutdown managed to finish within its timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    pub poller_stopped: bool,
    pub deliveries_drained: bool,
}

pub struct Monitor {
    poller: Arc<PresencePoller>,
    dispatcher: NotificationDispatcher,
    events: Arc<EventBus>,
    settings: MonitorSettings,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Monitor {
    pub fn new(parts: MonitorParts, settings: MonitorSettings) -> Self {
        let events = Arc::new(EventBus::default());
        let detector = TransitionDetector::new(parts.cache, parts.store, parts.entities.clone());
        let dispatcher = NotificationDispatcher::new(
            parts.channels,
            parts.sink,
            settings.dispatcher.clone(),
        );
        let poller = Arc::new(PresencePoller::new(
            parts.entities,
            parts.provider,
            detector,
            dispatcher.clone(),
            events.clone(),
            settings.poller.clone(),
        ));

        Self {
            poller,
            dispatcher,
            events,
            settings,
            cancel: CancellationToken::new(),
            task: None,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    pub fn poller(&self) -> &Arc<PresencePoller> {
        &self.poller
    }

    /// Start the scheduled poll loop. Calling it twice is a no-op.
    pub fn start(&mut self) {
        if self.task.is_some() {
            return;
        }
        self.task = Some(self.poller.clone().spawn(self.cancel.clone()));
    }

    /// Ask the running loop for an extra tick; dropped if one is in flight.
    pub fn request_tick(&self) -> bool {
        self.poller.request_tick()
    }

    /// Run exactly one tick on the caller's task and wait for the resulting
    /// deliveries to finish.
    pub async fn run_once(&self) -> TickOutcome {
        let outcome = self.poller.run_tick().await;
        if !self.dispatcher.drain(self.settings.drain_timeout).await {
            warn!("timed out waiting for notifications from manual tick");
        }
        outcome
    }

    /// Stop polling, then wait for outstanding deliveries.
    ///
    /// No tick starts after this is called. A tick already running gets
    /// `shutdown_timeout` to finish before it is abandoned.
    pub async fn shutdown(mut self) -> ShutdownReport {
        info!("shutting down presence monitor");
        self.cancel.cancel();

        let poller_stopped = match self.task.take() {
            None => true,
            Some(mut task) => {
                match tokio::time::timeout(self.settings.shutdown_timeout, &mut task).await {
                    Ok(_) => true,
                    Err(_) => {
                        warn!("in-flight tick did not finish in time, abandoning it");
                        task.abort();
                        false
                    }
                }
            }
        };

        let deliveries_drained = self.dispatcher.shutdown(self.settings.drain_timeout).await;
        self.events.publish(Event::Shutdown);

        ShutdownReport {
            poller_stopped,
            deliveries_drained,
        }
    }
}
