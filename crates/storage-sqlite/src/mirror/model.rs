//! Database model for mirrored ledger rows.

use diesel::prelude::*;
use serde_json::Value;

use crate::errors::StorageError;

/// One mirrored record, stored as JSON under its ledger table and natural key.
#[derive(Queryable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::mirror_rows)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MirrorRowDB {
    pub table_name: String,
    pub natural_key: String,
    pub row_json: String,
    pub updated_at: String,
}

impl MirrorRowDB {
    /// Builds the stored row, keyed by the value of `conflict_key`. Rows
    /// without that field have no identity and yield `None`.
    pub fn from_value(
        table: &str,
        row: &Value,
        conflict_key: &str,
        updated_at: &str,
    ) -> Result<Option<Self>, StorageError> {
        let natural_key = match row.get(conflict_key) {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Null) | None => return Ok(None),
            Some(Value::String(_)) => return Ok(None),
            Some(other) => other.to_string(),
        };
        Ok(Some(Self {
            table_name: table.to_string(),
            natural_key,
            row_json: serde_json::to_string(row)?,
            updated_at: updated_at.to_string(),
        }))
    }

    pub fn value(&self) -> Result<Value, StorageError> {
        Ok(serde_json::from_str(&self.row_json)?)
    }
}
