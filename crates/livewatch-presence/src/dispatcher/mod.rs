//! Fan-out of going-live notifications.
//!
//! Every rising edge becomes one tracked background task. The task resolves
//! the group's active destinations, builds a single payload, and sends it to
//! each destination concurrently. Outstanding tasks are bounded by
//! `max_in_flight`; shutdown waits for them up to a timeout.


use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use livewatch_common::notifications::DEFAULT_ACCENT_COLOR;
use livewatch_common::{new_id, LiveNotification, TransitionEvent};
use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;
use tracing::{info, warn, Instrument};

use crate::sink::NotificationSink;
use crate::store::ChannelRegistry;

#[derive(Debug, Clone)]
pub struct DispatcherSettings {
    /// Upper bound on outstanding delivery tasks.
    pub max_in_flight: usize,
    /// Footer text on every notification.
    pub footer: String,
    /// 24-bit RGB accent colour.
    pub color: u32,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            max_in_flight: 64,
            footer: "Livewatch Live Notifications".to_string(),
            color: DEFAULT_ACCENT_COLOR,
        }
    }
}

/// Outcome of delivering one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivery_id: String,
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Cloneable handle; clones share the task set and capacity.
#[derive(Clone)]
pub struct NotificationDispatcher {
    inner: Arc<Inner>,
}

struct Inner {
    channels: Arc<dyn ChannelRegistry>,
    sink: Arc<dyn NotificationSink>,
    settings: DispatcherSettings,
    tracker: TaskTracker,
    permits: Arc<Semaphore>,
    stopped: AtomicBool,
}

impl NotificationDispatcher {
    pub fn new(
        channels: Arc<dyn ChannelRegistry>,
        sink: Arc<dyn NotificationSink>,
        settings: DispatcherSettings,
    ) -> Self {
        let permits = Arc::new(Semaphore::new(settings.max_in_flight.max(1)));
        Self {
            inner: Arc::new(Inner {
                channels,
                sink,
                settings,
                tracker: TaskTracker::new(),
                permits,
                stopped: AtomicBool::new(false),
            }),
        }
    }

    /// Schedule delivery of `event` without waiting for it.
    ///
    /// Returns `false` if the event was dropped, either because shutdown has
    /// begun or because `max_in_flight` deliveries are already outstanding.
    pub fn dispatch(&self, event: TransitionEvent) -> bool {
        if self.inner.stopped.load(Ordering::Acquire) {
            warn!(handle = %event.handle, "dispatcher stopped, dropping notification");
            return false;
        }
        let permit = match Arc::clone(&self.inner.permits).try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!(
                    handle = %event.handle,
                    max_in_flight = self.inner.settings.max_in_flight,
                    "dispatcher at capacity, dropping notification"
                );
                return false;
            }
        };

        let this = self.clone();
        self.inner.tracker.spawn(async move {
            let _permit = permit;
            this.deliver(&event).await;
        });
        true
    }

    /// Deliver `event` to every active destination of its group and wait for
    /// all attempts to finish.
    pub async fn deliver(&self, event: &TransitionEvent) -> DeliveryReport {
        let delivery_id = new_id();
        let span = tracing::info_span!(
            "deliver",
            delivery_id = %delivery_id,
            handle = %event.handle,
            group = %event.group_id
        );
        self.deliver_inner(event, delivery_id).instrument(span).await
    }

    async fn deliver_inner(&self, event: &TransitionEvent, delivery_id: String) -> DeliveryReport {
        let mut report = DeliveryReport {
            delivery_id,
            ..DeliveryReport::default()
        };

        let channels = match self.inner.channels.active_channels(&event.group_id).await {
            Ok(channels) => channels,
            Err(e) => {
                warn!(error = %e, "failed to resolve notification channels");
                return report;
            }
        };
        if channels.is_empty() {
            info!("no active notification channel for group, skipping");
            return report;
        }

        let settings = &self.inner.settings;
        let notification = LiveNotification::going_live(event, &settings.footer, settings.color);
        let sends = channels.iter().map(|channel| {
            let notification = &notification;
            async move {
                let result = self
                    .inner
                    .sink
                    .send(&channel.destination_id, notification)
                    .await;
                (channel.destination_id.as_str(), result)
            }
        });

        for (destination, result) in join_all(sends).await {
            report.attempted += 1;
            match result {
                Ok(()) => {
                    report.delivered += 1;
                    info!(destination = %destination, "live notification sent");
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(destination = %destination, error = %e, "live notification failed");
                }
            }
        }
        report
    }

    /// Number of delivery tasks still running.
    pub fn in_flight(&self) -> usize {
        self.inner.tracker.len()
    }

    /// Wait up to `timeout` for outstanding deliveries without stopping the
    /// dispatcher. Returns `true` if everything finished.
    pub async fn drain(&self, timeout: Duration) -> bool {
        let tracker = &self.inner.tracker;
        tracker.close();
        let drained = tokio::time::timeout(timeout, tracker.wait()).await.is_ok();
        if !self.inner.stopped.load(Ordering::Acquire) {
            tracker.reopen();
        }
        drained
    }

    /// Stop accepting events and wait up to `timeout` for outstanding
    /// deliveries. Returns `true` if everything finished in time.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.inner.stopped.store(true, Ordering::Release);
        self.inner.tracker.close();
        let pending = self.inner.tracker.len();
        if pending > 0 {
            info!(pending, "waiting for in-flight notifications");
        }
        match tokio::time::timeout(timeout, self.inner.tracker.wait()).await {
            Ok(()) => true,
            Err(_) => {
                warn!(
                    pending = self.inner.tracker.len(),
                    "notification drain timed out, abandoning remaining deliveries"
                );
                false
            }
        }
    }
}
