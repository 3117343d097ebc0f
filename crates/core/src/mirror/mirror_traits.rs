use async_trait::async_trait;
use serde_json::Value;

use crate::errors::Result;

/// Equality filter over top-level fields of a mirror row. An empty filter
/// matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MirrorFilter {
    pub conditions: Vec<(String, Value)>,
}

impl MirrorFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::default().and(field, value)
    }

    pub fn and(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    pub fn matches(&self, row: &Value) -> bool {
        self.conditions
            .iter()
            .all(|(field, expected)| row.get(field) == Some(expected))
    }
}

/// The relational read replica of the ledgers.
#[async_trait]
pub trait MirrorStore: Send + Sync {
    /// Inserts or replaces rows by the value of `conflict_key`. Returns the
    /// number of rows written.
    async fn upsert(&self, table: &str, rows: &[Value], conflict_key: &str) -> Result<usize>;

    /// Returns the number of rows removed.
    async fn delete(&self, table: &str, filter: &MirrorFilter) -> Result<usize>;

    async fn select(&self, table: &str, filter: &MirrorFilter) -> Result<Vec<Value>>;
}
