//! Schema migrations, tracked through `PRAGMA user_version`.

use livewatch_common::StoreError;
use rusqlite::Connection;

use crate::backend_error;

struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_init.sql"),
}];

pub(crate) fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Apply every migration newer than the database's current version in one
/// transaction.
pub(crate) fn apply_migrations(conn: &mut Connection) -> Result<(), StoreError> {
    let current: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .map_err(backend_error)?;
    let latest = latest_version();

    if current > latest {
        return Err(StoreError::Backend(format!(
            "database schema version {current} is newer than supported version {latest}"
        )));
    }
    if current == latest {
        return Ok(());
    }

    let tx = conn.transaction().map_err(backend_error)?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        tx.execute_batch(migration.sql).map_err(backend_error)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))
            .map_err(backend_error)?;
    }
    tx.commit().map_err(backend_error)?;

    tracing::info!(from = current, to = latest, "applied store migrations");
    Ok(())
}
