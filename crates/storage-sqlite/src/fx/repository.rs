use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use log::warn;
use std::sync::Arc;

use super::model::RateCacheDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::fx_rate_cache;
use sheetfolio_core::fx::{CachedRate, RateStore};
use sheetfolio_core::Result;

/// Persistent rate tier. Survives restarts and is shared by every process
/// using the same database file.
pub struct SqliteRateStore {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SqliteRateStore {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl RateStore for SqliteRateStore {
    async fn get(&self, key: &str) -> Result<Option<CachedRate>> {
        let mut conn = get_connection(&self.pool)?;
        let row = fx_rate_cache::table
            .find(key)
            .select(RateCacheDB::as_select())
            .first::<RateCacheDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        match row.map(CachedRate::try_from).transpose() {
            Ok(rate) => Ok(rate),
            Err(e) => {
                // A corrupt entry behaves like a miss and is overwritten by the next put.
                warn!("Ignoring cached rate for {}: {}", key, e);
                Ok(None)
            }
        }
    }

    async fn put(&self, key: &str, rate: &CachedRate) -> Result<()> {
        let record = RateCacheDB::from_cached(key, rate);
        self.writer
            .exec(move |conn| {
                diesel::insert_into(fx_rate_cache::table)
                    .values(&record)
                    .on_conflict(fx_rate_cache::cache_key)
                    .do_update()
                    .set((
                        fx_rate_cache::rate.eq(excluded(fx_rate_cache::rate)),
                        fx_rate_cache::source.eq(excluded(fx_rate_cache::source)),
                        fx_rate_cache::fetched_at.eq(excluded(fx_rate_cache::fetched_at)),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}
