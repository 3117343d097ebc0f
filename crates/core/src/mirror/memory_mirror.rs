use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::mirror_traits::{MirrorFilter, MirrorStore};
use crate::errors::{Error, Result};

type Table = BTreeMap<String, Value>;

/// Mirror kept in process memory, keyed by table then conflict-key value.
#[derive(Default)]
pub struct InMemoryMirrorStore {
    tables: Mutex<HashMap<String, Table>>,
    failing: AtomicBool,
}

impl InMemoryMirrorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of rows in `table`.
    pub fn count(&self, table: &str) -> usize {
        self.tables
            .lock()
            .map(|t| t.get(table).map(BTreeMap::len).unwrap_or(0))
            .unwrap_or(0)
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Table>>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Mirror("mirror unavailable".to_string()));
        }
        self.tables.lock().map_err(|e| Error::Mirror(e.to_string()))
    }
}

fn conflict_value(row: &Value, conflict_key: &str) -> Result<String> {
    match row.get(conflict_key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) if !other.is_null() => Ok(other.to_string()),
        _ => Err(Error::Mirror(format!(
            "row has no '{}' conflict key",
            conflict_key
        ))),
    }
}

#[async_trait]
impl MirrorStore for InMemoryMirrorStore {
    async fn upsert(&self, table: &str, rows: &[Value], conflict_key: &str) -> Result<usize> {
        let mut tables = self.guard()?;
        let entries = tables.entry(table.to_string()).or_default();
        for row in rows {
            let key = conflict_value(row, conflict_key)?;
            entries.insert(key, row.clone());
        }
        Ok(rows.len())
    }

    async fn delete(&self, table: &str, filter: &MirrorFilter) -> Result<usize> {
        let mut tables = self.guard()?;
        let Some(entries) = tables.get_mut(table) else {
            return Ok(0);
        };
        let before = entries.len();
        entries.retain(|_, row| !filter.matches(row));
        Ok(before - entries.len())
    }

    async fn select(&self, table: &str, filter: &MirrorFilter) -> Result<Vec<Value>> {
        let tables = self.guard()?;
        Ok(tables
            .get(table)
            .map(|entries| {
                entries
                    .values()
                    .filter(|row| filter.matches(row))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_upsert_replaces_by_conflict_key() {
        let store = InMemoryMirrorStore::new();
        store
            .upsert("t", &[json!({"naturalKey": "a", "v": 1})], "naturalKey")
            .await
            .unwrap();
        store
            .upsert("t", &[json!({"naturalKey": "a", "v": 2})], "naturalKey")
            .await
            .unwrap();
        let rows = store.select("t", &MirrorFilter::all()).await.unwrap();
        assert_eq!(rows, vec![json!({"naturalKey": "a", "v": 2})]);
    }

    #[tokio::test]
    async fn test_delete_by_filter() {
        let store = InMemoryMirrorStore::new();
        let rows = [
            json!({"naturalKey": "a", "symbol": "AAPL"}),
            json!({"naturalKey": "b", "symbol": "MSFT"}),
        ];
        store.upsert("t", &rows, "naturalKey").await.unwrap();
        let removed = store
            .delete("t", &MirrorFilter::eq("symbol", "AAPL"))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.count("t"), 1);
        assert_eq!(store.delete("missing", &MirrorFilter::all()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_upsert_requires_conflict_key() {
        let store = InMemoryMirrorStore::new();
        let result = store.upsert("t", &[json!({"v": 1})], "naturalKey").await;
        assert!(matches!(result, Err(Error::Mirror(_))));
    }
}
