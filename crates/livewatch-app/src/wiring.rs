//! Turns a loaded [`LivewatchConfig`] into running components.

use std::sync::Arc;
use std::time::Duration;

use livewatch_clients::{DiscordClient, DiscordClientConfig, TwitchClient, TwitchClientConfig};
use livewatch_common::{CacheError, LivewatchError, StoreError};
use livewatch_config::schema::{CacheBackendKind, CacheConfig};
use livewatch_config::LivewatchConfig;
use livewatch_presence::{
    DispatcherSettings, MemoryCache, Monitor, MonitorParts, MonitorSettings, PollerSettings,
    PresenceCache, RedisCache, StatusProvider,
};
use livewatch_store::SqliteStore;
use tracing::{info, warn};

const REDIS_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub fn open_store(config: &LivewatchConfig) -> Result<SqliteStore, StoreError> {
    SqliteStore::open(&config.store.path)
}

pub fn twitch_client(config: &LivewatchConfig) -> Result<TwitchClient, LivewatchError> {
    let twitch = &config.twitch;
    let client_config = TwitchClientConfig::new(&twitch.client_id, &twitch.client_secret)
        .with_api_base(&twitch.api_base)
        .with_auth_url(&twitch.auth_url)
        .with_request_timeout(Duration::from_secs(twitch.request_timeout_secs));
    Ok(TwitchClient::new(client_config)?)
}

pub fn discord_client(config: &LivewatchConfig) -> Result<DiscordClient, LivewatchError> {
    let discord = &config.discord;
    let client_config = DiscordClientConfig::new(&discord.bot_token)
        .with_api_base(&discord.api_base)
        .with_request_timeout(Duration::from_secs(discord.request_timeout_secs));
    Ok(DiscordClient::new(client_config)?)
}

/// Build the presence cache. An unreachable Redis degrades to the in-memory
/// backend; the store stays authoritative either way.
pub async fn presence_cache(config: &CacheConfig) -> PresenceCache {
    let ttl = Duration::from_secs(config.ttl_secs);
    match config.backend {
        CacheBackendKind::Memory => {
            PresenceCache::new(Arc::new(MemoryCache::new()), ttl, &config.key_prefix)
        }
        CacheBackendKind::Redis => {
            match tokio::time::timeout(REDIS_CONNECT_TIMEOUT, connect_redis(&config.redis_url))
                .await
            {
                Ok(Ok(redis)) => {
                    info!("using redis presence cache");
                    PresenceCache::new(Arc::new(redis), ttl, &config.key_prefix)
                }
                Ok(Err(e)) => {
                    warn!(error = %e, "redis unavailable, falling back to in-memory cache");
                    PresenceCache::new(Arc::new(MemoryCache::new()), ttl, &config.key_prefix)
                }
                Err(_) => {
                    warn!("redis connect timed out, falling back to in-memory cache");
                    PresenceCache::new(Arc::new(MemoryCache::new()), ttl, &config.key_prefix)
                }
            }
        }
    }
}

/// Connect and round-trip a PING so an unusable server is caught at startup.
async fn connect_redis(url: &str) -> Result<RedisCache, CacheError> {
    let redis = RedisCache::connect(url).await?;
    redis.ping().await?;
    Ok(redis)
}

pub fn monitor_settings(config: &LivewatchConfig) -> MonitorSettings {
    MonitorSettings {
        poller: PollerSettings {
            interval: Duration::from_secs(config.poller.interval_secs),
            initial_delay: Duration::from_secs(config.poller.initial_delay_secs),
            batch_size: config.poller.batch_size as usize,
        },
        dispatcher: DispatcherSettings {
            max_in_flight: config.dispatch.max_in_flight as usize,
            footer: config.dispatch.footer.clone(),
            color: config.dispatch.accent_color,
        },
        shutdown_timeout: Duration::from_secs(config.poller.shutdown_timeout_secs),
        drain_timeout: Duration::from_secs(config.dispatch.drain_timeout_secs),
    }
}

/// Wire the full pipeline against the real provider, sink and store.
///
/// Fails when the store cannot be opened or the provider rejects the
/// configured credentials.
pub async fn build_monitor(config: &LivewatchConfig) -> Result<Monitor, LivewatchError> {
    livewatch_config::validation::validate_credentials(config)?;

    let store = Arc::new(open_store(config)?);
    let twitch = Arc::new(twitch_client(config)?);
    twitch.authenticate().await?;
    info!("twitch credentials accepted");
    let discord = Arc::new(discord_client(config)?);

    let parts = MonitorParts {
        cache: presence_cache(&config.cache).await,
        store: store.clone(),
        entities: store.clone(),
        channels: store,
        provider: twitch,
        sink: discord,
    };
    Ok(Monitor::new(parts, monitor_settings(config)))
}
