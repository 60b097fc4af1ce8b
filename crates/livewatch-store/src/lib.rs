//! SQLite-backed implementation of the pipeline's durable stores.
//!
//! A single [`SqliteStore`] implements [`PresenceStore`], [`EntityRegistry`]
//! and [`ChannelRegistry`] over one connection. Calls run on the blocking
//! pool so the poller's runtime threads never wait on disk.
//!
//! [`PresenceStore`]: livewatch_presence::PresenceStore
//! [`EntityRegistry`]: livewatch_presence::EntityRegistry
//! [`ChannelRegistry`]: livewatch_presence::ChannelRegistry

mod channels;
mod entities;
mod migrations;
mod presence;


use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use livewatch_common::StoreError;
use rusqlite::Connection;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) fn backend_error(err: rusqlite::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Codec(format!("bad timestamp '{raw}': {e}")))
}

/// Shared handle to the livewatch database. Cheap to clone.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.path)
            .finish()
    }
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and migrate it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Backend(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        tracing::info!(path = %path.display(), "opening presence database");
        let conn = Connection::open(path).map_err(backend_error)?;
        let mode: String = conn
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
            .map_err(backend_error)?;
        tracing::debug!(journal_mode = %mode, "database journal mode");
        Self::bootstrap(conn, Some(path.to_path_buf()))
    }

    /// A private in-memory database, gone when the last clone is dropped.
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(backend_error)?;
        Self::bootstrap(conn, None)
    }

    fn bootstrap(mut conn: Connection, path: Option<PathBuf>) -> Result<Self, StoreError> {
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(backend_error)?;
        conn.busy_timeout(BUSY_TIMEOUT).map_err(backend_error)?;
        migrations::apply_migrations(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run `f` against the connection on the blocking pool.
    pub(crate) async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::Backend("connection mutex poisoned".into()))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| StoreError::Backend(format!("store task failed: {e}")))?
    }
}
