pub mod errors;
pub mod events;
pub mod id;
pub mod notifications;
pub mod types;

pub use errors::{
    CacheError, ConfigError, DispatchError, LivewatchError, ProviderError, StoreError,
};
pub use events::{Event, EventBus};
pub use id::{new_correlation_id, new_id};
pub use notifications::LiveNotification;
pub use types::{
    CacheEntry, Handle, LiveStatus, NotificationChannel, Observation, PresenceRecord,
    TrackedEntity, TransitionEvent,
};

pub type Result<T> = std::result::Result<T, LivewatchError>;
