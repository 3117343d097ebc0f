//! Database model for cached exchange rates.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::errors::StorageError;
use sheetfolio_core::fx::CachedRate;

#[derive(Queryable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::fx_rate_cache)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RateCacheDB {
    pub cache_key: String,
    /// Decimal text, so no precision is lost to SQLite REAL.
    pub rate: String,
    pub source: String,
    /// RFC 3339.
    pub fetched_at: String,
}

impl RateCacheDB {
    pub fn from_cached(key: &str, cached: &CachedRate) -> Self {
        Self {
            cache_key: key.to_string(),
            rate: cached.rate.to_string(),
            source: cached.source.clone(),
            fetched_at: cached.fetched_at.to_rfc3339(),
        }
    }
}

impl TryFrom<RateCacheDB> for CachedRate {
    type Error = StorageError;

    fn try_from(db: RateCacheDB) -> Result<Self, Self::Error> {
        let rate = Decimal::from_str(&db.rate).map_err(|e| {
            StorageError::SerializationError(format!("rate '{}' for {}: {}", db.rate, db.cache_key, e))
        })?;
        let fetched_at = DateTime::parse_from_rfc3339(&db.fetched_at)
            .map_err(|e| {
                StorageError::SerializationError(format!(
                    "timestamp '{}' for {}: {}",
                    db.fetched_at, db.cache_key, e
                ))
            })?
            .with_timezone(&Utc);
        Ok(CachedRate {
            rate,
            source: db.source,
            fetched_at,
        })
    }
}
