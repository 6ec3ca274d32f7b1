//! In-memory key-value store backed by a `DashMap`.
//!
//! Used by tests and by diagnostics tooling that wants a throwaway store;
//! carries no durability.

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;

use super::KeyValueStore;

/// Volatile store with the same contract as the sqlite backend
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys (test helper)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn remove_many(&self, keys: &[String]) -> Result<()> {
        for key in keys {
            self.entries.remove(key);
        }
        Ok(())
    }

    async fn get_all_keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.iter().map(|e| e.key().clone()).collect())
    }
}
