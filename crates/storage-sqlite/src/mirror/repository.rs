use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use log::warn;
use serde_json::Value;
use std::sync::Arc;

use super::model::MirrorRowDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::mirror_rows;
use sheetfolio_core::mirror::{MirrorFilter, MirrorStore};
use sheetfolio_core::Result;

/// Mirror tables kept as JSON rows in one SQLite table, keyed by
/// `(table_name, natural_key)`. Filters are applied to the decoded rows.
pub struct SqliteMirrorStore {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SqliteMirrorStore {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    fn load_table(conn: &mut SqliteConnection, table: &str) -> Result<Vec<MirrorRowDB>> {
        Ok(mirror_rows::table
            .filter(mirror_rows::table_name.eq(table))
            .order(mirror_rows::natural_key.asc())
            .select(MirrorRowDB::as_select())
            .load::<MirrorRowDB>(conn)
            .map_err(StorageError::from)?)
    }

    fn decode(rows: Vec<MirrorRowDB>, filter: &MirrorFilter) -> Vec<(String, Value)> {
        rows.into_iter()
            .filter_map(|row| match row.value() {
                Ok(value) => Some((row.natural_key, value)),
                Err(e) => {
                    warn!(
                        "Skipping unreadable mirror row {}/{}: {}",
                        row.table_name, row.natural_key, e
                    );
                    None
                }
            })
            .filter(|(_, value)| filter.matches(value))
            .collect()
    }
}

#[async_trait]
impl MirrorStore for SqliteMirrorStore {
    async fn upsert(&self, table: &str, rows: &[Value], conflict_key: &str) -> Result<usize> {
        let now = Utc::now().to_rfc3339();
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            match MirrorRowDB::from_value(table, row, conflict_key, &now)? {
                Some(record) => records.push(record),
                None => warn!("Mirror row for {} has no {}; skipped", table, conflict_key),
            }
        }
        if records.is_empty() {
            return Ok(0);
        }

        self.writer
            .exec(move |conn| {
                let mut written = 0;
                for record in &records {
                    written += diesel::insert_into(mirror_rows::table)
                        .values(record)
                        .on_conflict((mirror_rows::table_name, mirror_rows::natural_key))
                        .do_update()
                        .set((
                            mirror_rows::row_json.eq(&record.row_json),
                            mirror_rows::updated_at.eq(&record.updated_at),
                        ))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(written)
            })
            .await
    }

    async fn delete(&self, table: &str, filter: &MirrorFilter) -> Result<usize> {
        let table = table.to_string();
        let filter = filter.clone();
        self.writer
            .exec(move |conn| {
                let keys: Vec<String> = Self::decode(Self::load_table(conn, &table)?, &filter)
                    .into_iter()
                    .map(|(key, _)| key)
                    .collect();
                if keys.is_empty() {
                    return Ok(0);
                }
                Ok(diesel::delete(
                    mirror_rows::table
                        .filter(mirror_rows::table_name.eq(&table))
                        .filter(mirror_rows::natural_key.eq_any(&keys)),
                )
                .execute(conn)
                .map_err(StorageError::from)?)
            })
            .await
    }

    async fn select(&self, table: &str, filter: &MirrorFilter) -> Result<Vec<Value>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = Self::load_table(&mut conn, table)?;
        Ok(Self::decode(rows, filter)
            .into_iter()
            .map(|(_, value)| value)
            .collect())
    }
}
