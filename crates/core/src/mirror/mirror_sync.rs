use log::{debug, warn};
use serde_json::Value;
use std::sync::Arc;

use super::mirror_traits::{MirrorFilter, MirrorStore};
use crate::errors::Result;
use crate::ledger::NATURAL_KEY_FIELD;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorMode {
    /// Writes run on a spawned task; the caller never waits.
    Background,
    /// Writes are awaited. Failures are still swallowed.
    Inline,
    Disabled,
}

/// Best-effort replication of ledger writes into the mirror.
///
/// A mirror failure is logged and dropped: the ledger stays the source of
/// truth and a stale mirror row is overwritten on the next write.
#[derive(Clone)]
pub struct MirrorSync {
    store: Option<Arc<dyn MirrorStore>>,
    mode: MirrorMode,
}

impl MirrorSync {
    pub fn new(store: Arc<dyn MirrorStore>, mode: MirrorMode) -> Self {
        Self {
            store: Some(store),
            mode,
        }
    }

    pub fn background(store: Arc<dyn MirrorStore>) -> Self {
        Self::new(store, MirrorMode::Background)
    }

    pub fn inline(store: Arc<dyn MirrorStore>) -> Self {
        Self::new(store, MirrorMode::Inline)
    }

    pub fn disabled() -> Self {
        Self {
            store: None,
            mode: MirrorMode::Disabled,
        }
    }

    pub fn mode(&self) -> MirrorMode {
        self.mode
    }

    fn active_store(&self) -> Option<Arc<dyn MirrorStore>> {
        match self.mode {
            MirrorMode::Disabled => None,
            _ => self.store.clone(),
        }
    }

    /// Upserts one row keyed by its natural key.
    pub async fn upsert(&self, table: &'static str, row: Value) {
        let Some(store) = self.active_store() else {
            return;
        };
        let task = async move {
            match store.upsert(table, &[row], NATURAL_KEY_FIELD).await {
                Ok(n) => debug!("Mirrored {} row(s) into {}", n, table),
                Err(e) => warn!("Mirror upsert into {} failed: {}", table, e),
            }
        };
        self.run(task).await;
    }

    pub async fn delete(&self, table: &'static str, filter: MirrorFilter) {
        let Some(store) = self.active_store() else {
            return;
        };
        let task = async move {
            if let Err(e) = store.delete(table, &filter).await {
                warn!("Mirror delete from {} failed: {}", table, e);
            }
        };
        self.run(task).await;
    }

    /// Deletes and waits for the result regardless of mode. Returns the
    /// number of rows removed, 0 on failure or when disabled.
    pub async fn delete_now(&self, table: &str, filter: &MirrorFilter) -> usize {
        let Some(store) = self.active_store() else {
            return 0;
        };
        match store.delete(table, filter).await {
            Ok(n) => n,
            Err(e) => {
                warn!("Mirror delete from {} failed: {}", table, e);
                0
            }
        }
    }

    /// Reads from the mirror. Unlike writes, errors propagate.
    pub async fn select(&self, table: &str, filter: &MirrorFilter) -> Result<Vec<Value>> {
        match &self.store {
            Some(store) => store.select(table, filter).await,
            None => Ok(Vec::new()),
        }
    }

    async fn run<F>(&self, task: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        match self.mode {
            MirrorMode::Background => {
                tokio::spawn(task);
            }
            MirrorMode::Inline => task.await,
            MirrorMode::Disabled => {}
        }
    }
}
