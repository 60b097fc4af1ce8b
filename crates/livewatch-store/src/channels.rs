use async_trait::async_trait;
use chrono::Utc;
use livewatch_common::{NotificationChannel, StoreError};
use livewatch_presence::ChannelRegistry;
use rusqlite::params;

use crate::{backend_error, SqliteStore};

#[async_trait]
impl ChannelRegistry for SqliteStore {
    async fn active_channels(
        &self,
        group_id: &str,
    ) -> Result<Vec<NotificationChannel>, StoreError> {
        let group_id = group_id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT group_id, destination_id FROM notification_channels
                     WHERE group_id = ?1 AND active = 1",
                )
                .map_err(backend_error)?;
            let rows = stmt
                .query_map(params![group_id], |row| {
                    Ok(NotificationChannel {
                        group_id: row.get(0)?,
                        destination_id: row.get(1)?,
                        active: true,
                    })
                })
                .map_err(backend_error)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(backend_error)
        })
        .await
    }

    async fn set_active_channel(
        &self,
        group_id: &str,
        destination_id: &str,
    ) -> Result<(), StoreError> {
        let group_id = group_id.to_string();
        let destination_id = destination_id.to_string();
        self.with_conn(move |conn| {
            let now = Utc::now().to_rfc3339();
            let tx = conn.transaction().map_err(backend_error)?;
            tx.execute(
                "UPDATE notification_channels SET active = 0, updated_at = ?2
                 WHERE group_id = ?1 AND active = 1",
                params![group_id, now],
            )
            .map_err(backend_error)?;
            tx.execute(
                "INSERT INTO notification_channels (group_id, destination_id, active, updated_at)
                 VALUES (?1, ?2, 1, ?3)
                 ON CONFLICT (group_id, destination_id) DO UPDATE SET
                    active = 1,
                    updated_at = excluded.updated_at",
                params![group_id, destination_id, now],
            )
            .map_err(backend_error)?;
            tx.commit().map_err(backend_error)?;
            tracing::info!(group = %group_id, destination = %destination_id, "notification channel set");
            Ok(())
        })
        .await
    }
}
