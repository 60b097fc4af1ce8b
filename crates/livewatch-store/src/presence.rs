use async_trait::async_trait;
use livewatch_common::{Handle, PresenceRecord, StoreError};
use livewatch_presence::PresenceStore;
use rusqlite::{params, OptionalExtension};

use crate::{backend_error, parse_timestamp, SqliteStore};

struct RecordRow {
    handle: String,
    is_live: bool,
    viewer_count: i64,
    category: String,
    title: String,
    last_checked: String,
    owner_id: Option<String>,
}

impl RecordRow {
    fn into_record(self) -> Result<PresenceRecord, StoreError> {
        let handle = Handle::parse(&self.handle).map_err(|e| StoreError::Codec(e.to_string()))?;
        Ok(PresenceRecord {
            handle,
            is_live: self.is_live,
            viewer_count: u32::try_from(self.viewer_count.max(0)).unwrap_or(u32::MAX),
            category: self.category,
            title: self.title,
            last_checked: parse_timestamp(&self.last_checked)?,
            owner_id: self.owner_id,
        })
    }
}

#[async_trait]
impl PresenceStore for SqliteStore {
    async fn get(&self, handle: &Handle) -> Result<Option<PresenceRecord>, StoreError> {
        let key = handle.key().to_string();
        let row = self
            .with_conn(move |conn| {
                conn.query_row(
                    "SELECT handle, is_live, viewer_count, category, title, last_checked, owner_id
                     FROM presence_records WHERE handle_key = ?1",
                    params![key],
                    |row| {
                        Ok(RecordRow {
                            handle: row.get(0)?,
                            is_live: row.get(1)?,
                            viewer_count: row.get(2)?,
                            category: row.get(3)?,
                            title: row.get(4)?,
                            last_checked: row.get(5)?,
                            owner_id: row.get(6)?,
                        })
                    },
                )
                .optional()
                .map_err(backend_error)
            })
            .await?;
        row.map(RecordRow::into_record).transpose()
    }

    async fn put(&self, record: &PresenceRecord) -> Result<(), StoreError> {
        let record = record.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO presence_records
                    (handle_key, handle, is_live, viewer_count, category, title, last_checked, owner_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT (handle_key) DO UPDATE SET
                    handle = excluded.handle,
                    is_live = excluded.is_live,
                    viewer_count = excluded.viewer_count,
                    category = excluded.category,
                    title = excluded.title,
                    last_checked = excluded.last_checked,
                    owner_id = excluded.owner_id",
                params![
                    record.handle.key(),
                    record.handle.as_str(),
                    record.is_live,
                    i64::from(record.viewer_count),
                    record.category,
                    record.title,
                    record.last_checked.to_rfc3339(),
                    record.owner_id,
                ],
            )
            .map_err(backend_error)?;
            Ok(())
        })
        .await
    }
}
