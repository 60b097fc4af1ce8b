use async_trait::async_trait;
use chrono::Utc;
use livewatch_common::{Handle, StoreError, TrackedEntity};
use livewatch_presence::EntityRegistry;
use rusqlite::{params, Connection, Params};
use tracing::warn;

use crate::{backend_error, SqliteStore};

const ENTITY_COLUMNS: &str = "owner_id, owner_name, handle, group_id, active";

struct EntityRow {
    owner_id: String,
    owner_name: String,
    handle: String,
    group_id: String,
    active: bool,
}

fn select_entities<P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<EntityRow>, StoreError> {
    let mut stmt = conn.prepare(sql).map_err(backend_error)?;
    let rows = stmt
        .query_map(params, |row| {
            Ok(EntityRow {
                owner_id: row.get(0)?,
                owner_name: row.get(1)?,
                handle: row.get(2)?,
                group_id: row.get(3)?,
                active: row.get(4)?,
            })
        })
        .map_err(backend_error)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(backend_error)
}

/// Rows with a handle that no longer parses are skipped, not fatal.
fn into_entities(rows: Vec<EntityRow>) -> Vec<TrackedEntity> {
    rows.into_iter()
        .filter_map(|row| match Handle::parse(&row.handle) {
            Ok(handle) => Some(TrackedEntity {
                owner_id: row.owner_id,
                owner_name: row.owner_name,
                handle,
                group_id: row.group_id,
                active: row.active,
            }),
            Err(e) => {
                warn!(owner_id = %row.owner_id, error = %e, "skipping entity with invalid handle");
                None
            }
        })
        .collect()
}

#[async_trait]
impl EntityRegistry for SqliteStore {
    async fn active_entities(&self) -> Result<Vec<TrackedEntity>, StoreError> {
        let rows = self
            .with_conn(|conn| {
                select_entities(
                    conn,
                    &format!(
                        "SELECT {ENTITY_COLUMNS} FROM tracked_entities
                         WHERE active = 1 ORDER BY handle_key"
                    ),
                    [],
                )
            })
            .await?;
        Ok(into_entities(rows))
    }

    async fn entity_by_handle(
        &self,
        handle: &Handle,
    ) -> Result<Option<TrackedEntity>, StoreError> {
        let key = handle.key().to_string();
        let rows = self
            .with_conn(move |conn| {
                select_entities(
                    conn,
                    &format!(
                        "SELECT {ENTITY_COLUMNS} FROM tracked_entities
                         WHERE handle_key = ?1
                         ORDER BY active DESC, linked_at ASC LIMIT 1"
                    ),
                    params![key],
                )
            })
            .await?;
        Ok(into_entities(rows).into_iter().next())
    }

    async fn link(&self, entity: &TrackedEntity) -> Result<(), StoreError> {
        let entity = entity.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO tracked_entities
                    (owner_id, owner_name, handle, handle_key, group_id, active, linked_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT (owner_id) DO UPDATE SET
                    owner_name = excluded.owner_name,
                    handle = excluded.handle,
                    handle_key = excluded.handle_key,
                    group_id = excluded.group_id,
                    active = excluded.active,
                    linked_at = excluded.linked_at",
                params![
                    entity.owner_id,
                    entity.owner_name,
                    entity.handle.as_str(),
                    entity.handle.key(),
                    entity.group_id,
                    entity.active,
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(backend_error)?;
            Ok(())
        })
        .await
    }

    async fn unlink(&self, owner_id: &str) -> Result<bool, StoreError> {
        let owner_id = owner_id.to_string();
        self.with_conn(move |conn| {
            let removed = conn
                .execute(
                    "DELETE FROM tracked_entities WHERE owner_id = ?1",
                    params![owner_id],
                )
                .map_err(backend_error)?;
            Ok(removed > 0)
        })
        .await
    }

    async fn entities_in_group(&self, group_id: &str) -> Result<Vec<TrackedEntity>, StoreError> {
        let group_id = group_id.to_string();
        let rows = self
            .with_conn(move |conn| {
                select_entities(
                    conn,
                    &format!(
                        "SELECT {ENTITY_COLUMNS} FROM tracked_entities
                         WHERE active = 1 AND group_id = ?1 ORDER BY handle_key"
                    ),
                    params![group_id],
                )
            })
            .await?;
        Ok(into_entities(rows))
    }
}
