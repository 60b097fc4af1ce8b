//! Live-presence monitoring and notification pipeline.
//!
//! A [`PresencePoller`] periodically asks a [`StatusProvider`] which tracked
//! handles are live, reconciles each answer against the last known state via
//! the [`TransitionDetector`] (cache first, durable store second), and hands
//! every offline -> live edge to the [`NotificationDispatcher`], which fans
//! the payload out to the group's destinations on tracked background tasks.
//!
//! [`Monitor`] wires these together and owns cooperative shutdown.

pub mod cache;
pub mod detector;
pub mod dispatcher;
pub mod poller;
pub mod provider;
pub mod service;
pub mod sink;
pub mod store;

#[cfg(test)]
mod testing;

#[cfg(feature = "redis-cache")]
pub use cache::RedisCache;
pub use cache::{CacheBackend, MemoryCache, PresenceCache};
pub use detector::{Transition, TransitionDetector};
pub use dispatcher::{DeliveryReport, DispatcherSettings, NotificationDispatcher};
pub use poller::{PollerSettings, PresencePoller, TickOutcome, TickSummary};
pub use provider::{query_with_reauth, StatusProvider};
pub use service::{Monitor, MonitorParts, MonitorSettings, ShutdownReport};
pub use sink::NotificationSink;
pub use store::{live_in_group, ChannelRegistry, EntityRegistry, MemoryStore, PresenceStore};
