use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use super::fx_model::CachedRate;
use super::fx_traits::RateStore;
use crate::errors::{DatabaseError, Error, Result};

/// Rate store kept in memory.
#[derive(Default)]
pub struct InMemoryRateStore {
    entries: RwLock<HashMap<String, CachedRate>>,
    failing: AtomicBool,
}

impl InMemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Database(DatabaseError::ConnectionFailed(
                "rate store unavailable".to_string(),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RateStore for InMemoryRateStore {
    async fn get(&self, key: &str) -> Result<Option<CachedRate>> {
        self.check()?;
        let entries = self
            .entries
            .read()
            .map_err(|e| Error::Database(DatabaseError::Internal(e.to_string())))?;
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &str, rate: &CachedRate) -> Result<()> {
        self.check()?;
        let mut entries = self
            .entries
            .write()
            .map_err(|e| Error::Database(DatabaseError::Internal(e.to_string())))?;
        entries.insert(key.to_string(), rate.clone());
        Ok(())
    }
}
