use dashmap::DashMap;

use super::fx_model::CachedRate;

/// A synchronous cache tier.
pub trait CacheTier: Send + Sync {
    fn get(&self, key: &str) -> Option<CachedRate>;
    fn put(&self, key: &str, rate: CachedRate);
}

/// Process-wide memory tier. Concurrent puts of the same key are last-write-wins.
#[derive(Default)]
pub struct MemoryRateCache {
    entries: DashMap<String, CachedRate>,
}

impl MemoryRateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheTier for MemoryRateCache {
    fn get(&self, key: &str) -> Option<CachedRate> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn put(&self, key: &str, rate: CachedRate) {
        self.entries.insert(key.to_string(), rate);
    }
}
