//! Subcommand implementations.

use std::path::Path;

use livewatch_common::{Event, Handle, LivewatchError, PresenceRecord, TrackedEntity};
use livewatch_config::LivewatchConfig;
use livewatch_presence::{
    live_in_group, query_with_reauth, ChannelRegistry, EntityRegistry, StatusProvider, TickOutcome,
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::wiring;

fn parse_handle(raw: &str) -> Result<Handle, LivewatchError> {
    Handle::parse(raw).map_err(|e| LivewatchError::Other(e.to_string()))
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

pub async fn run(config: &LivewatchConfig) -> Result<(), LivewatchError> {
    let mut monitor = wiring::build_monitor(config).await?;
    let logger = tokio::spawn(log_events(monitor.subscribe()));

    monitor.start();
    info!(
        interval_secs = config.poller.interval_secs,
        "livewatch running, press Ctrl-C to stop"
    );

    shutdown_signal().await?;
    info!("shutdown signal received");

    let report = monitor.shutdown().await;
    if !report.poller_stopped {
        warn!("poller did not stop cleanly");
    }
    if !report.deliveries_drained {
        warn!("some notifications were still in flight at exit");
    }
    if let Err(e) = logger.await {
        debug!(error = %e, "event logger ended abnormally");
    }
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() -> Result<(), LivewatchError> {
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res?,
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;
    Ok(())
}

/// Log pipeline events until the bus shuts down.
async fn log_events(mut events: broadcast::Receiver<Event>) {
    loop {
        match events.recv().await {
            Ok(Event::WentLive(event)) => info!(
                handle = %event.handle,
                owner = %event.owner_name,
                group = %event.group_id,
                "broadcaster went live"
            ),
            Ok(Event::WentOffline { handle }) => debug!(handle = %handle, "broadcaster went offline"),
            Ok(Event::TickCompleted {
                tick_id,
                checked,
                live,
                failed,
            }) => debug!(tick_id = %tick_id, checked, live, failed, "tick event"),
            Ok(Event::TickFailed { tick_id, reason }) => {
                warn!(tick_id = %tick_id, reason = %reason, "tick failed")
            }
            Ok(Event::Shutdown) | Err(broadcast::error::RecvError::Closed) => break,
            Ok(Event::Unknown) => {}
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(skipped = n, "event logger lagged");
            }
        }
    }
}

/// One tick against the real provider, waiting for its notifications.
pub async fn check(config: &LivewatchConfig) -> Result<(), LivewatchError> {
    let monitor = wiring::build_monitor(config).await?;
    let outcome = monitor.run_once().await;
    monitor.shutdown().await;

    match outcome {
        TickOutcome::Completed(summary) => {
            println!(
                "checked {} handle(s): {} live, {} went live, {} went offline, {} failed",
                summary.checked, summary.live, summary.went_live, summary.went_offline, summary.failed
            );
            Ok(())
        }
        TickOutcome::NoEntities => {
            println!("no broadcasters are being tracked");
            Ok(())
        }
        TickOutcome::Skipped => {
            println!("a tick was already running");
            Ok(())
        }
        TickOutcome::Aborted { error, .. } => Err(error),
    }
}

pub async fn probe(config: &LivewatchConfig, raw: &[String]) -> Result<(), LivewatchError> {
    let handles = raw
        .iter()
        .map(|h| parse_handle(h))
        .collect::<Result<Vec<_>, _>>()?;
    let twitch = wiring::twitch_client(config)?;

    let mut live = Vec::new();
    for chunk in handles.chunks(twitch.max_batch()) {
        live.extend(query_with_reauth(&twitch, chunk).await?);
    }

    for handle in &handles {
        match live.iter().find(|s| &s.handle == handle) {
            Some(status) => println!(
                "{handle}: LIVE, {} viewers, {} - {}",
                status.viewer_count, status.category, status.title
            ),
            None => println!("{handle}: offline"),
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

pub async fn link(
    config: &LivewatchConfig,
    handle: &str,
    owner_id: &str,
    owner_name: &str,
    group_id: &str,
) -> Result<(), LivewatchError> {
    let store = wiring::open_store(config)?;
    let entity = TrackedEntity {
        owner_id: owner_id.to_string(),
        owner_name: owner_name.to_string(),
        handle: parse_handle(handle)?,
        group_id: group_id.to_string(),
        active: true,
    };
    store.link(&entity).await?;
    println!("linked {} to {owner_name} in group {group_id}", entity.handle);
    Ok(())
}

pub async fn unlink(config: &LivewatchConfig, owner_id: &str) -> Result<(), LivewatchError> {
    let store = wiring::open_store(config)?;
    if store.unlink(owner_id).await? {
        println!("unlinked owner {owner_id}");
    } else {
        println!("owner {owner_id} had nothing linked");
    }
    Ok(())
}

pub async fn set_channel(
    config: &LivewatchConfig,
    group_id: &str,
    destination_id: &str,
) -> Result<(), LivewatchError> {
    let store = wiring::open_store(config)?;
    store.set_active_channel(group_id, destination_id).await?;
    println!("group {group_id} now notifies {destination_id}");
    Ok(())
}

pub async fn live(config: &LivewatchConfig, group_id: &str) -> Result<(), LivewatchError> {
    let store = wiring::open_store(config)?;
    let live = live_in_group(&store, &store, group_id).await?;
    print!("{}", format_live(group_id, &live));
    Ok(())
}

/// One line per live broadcaster, busiest first.
fn format_live(group_id: &str, live: &[(TrackedEntity, PresenceRecord)]) -> String {
    if live.is_empty() {
        return format!("nobody in group {group_id} is live\n");
    }
    let mut out = String::new();
    for (entity, record) in live {
        let title = if record.title.is_empty() {
            "(untitled)"
        } else {
            record.title.as_str()
        };
        out.push_str(&format!(
            "{} ({}): {title} | {} | {} viewers | https://twitch.tv/{}\n",
            entity.owner_name,
            entity.handle,
            record.category,
            record.viewer_count,
            entity.handle.key()
        ));
    }
    out
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

pub fn config_show(config: &LivewatchConfig) {
    println!("{}", livewatch_config::config_to_json(config));
}

pub fn config_path(override_path: Option<&Path>) -> Result<(), LivewatchError> {
    let path = match override_path {
        Some(path) => path.to_path_buf(),
        None => livewatch_config::toml_loader::default_config_path()?,
    };
    println!("{}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use livewatch_presence::PresenceStore;

    fn config_in(dir: &Path) -> LivewatchConfig {
        let mut config = LivewatchConfig::default();
        config.store.path = dir.join("livewatch.db").display().to_string();
        config
    }

    #[tokio::test]
    async fn link_then_unlink_round_trips_through_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        link(&config, "Nova", "u1", "Ada", "g1").await.unwrap();
        let store = wiring::open_store(&config).unwrap();
        let entities = store.active_entities().await.unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].owner_name, "Ada");

        unlink(&config, "u1").await.unwrap();
        assert!(store.active_entities().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn link_rejects_bad_handle() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let err = link(&config, "not a handle", "u1", "Ada", "g1")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid handle"));
    }

    #[tokio::test]
    async fn set_channel_switches_destination() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        set_channel(&config, "g1", "111").await.unwrap();
        set_channel(&config, "g1", "222").await.unwrap();

        let store = wiring::open_store(&config).unwrap();
        let active = store.active_channels("g1").await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].destination_id, "222");
    }

    fn live_record(handle: &str, viewers: u32, title: &str) -> PresenceRecord {
        PresenceRecord {
            handle: parse_handle(handle).unwrap(),
            is_live: true,
            viewer_count: viewers,
            category: "Art".into(),
            title: title.into(),
            last_checked: chrono::Utc::now(),
            owner_id: Some("u1".into()),
        }
    }

    #[tokio::test]
    async fn live_reads_durable_state() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        link(&config, "Nova", "u1", "Ada", "g1").await.unwrap();
        link(&config, "orbit", "u2", "Bo", "g1").await.unwrap();

        let store = wiring::open_store(&config).unwrap();
        store.put(&live_record("nova", 5, "")).await.unwrap();
        store.put(&live_record("orbit", 40, "speedrun")).await.unwrap();

        let rows = live_in_group(&store, &store, "g1").await.unwrap();
        let text = format_live("g1", &rows);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "Bo (orbit): speedrun | Art | 40 viewers | https://twitch.tv/orbit",
                "Ada (Nova): (untitled) | Art | 5 viewers | https://twitch.tv/nova",
            ]
        );

        live(&config, "g1").await.unwrap();
    }

    #[test]
    fn empty_group_says_so() {
        assert_eq!(format_live("g9", &[]), "nobody in group g9 is live\n");
    }
}
