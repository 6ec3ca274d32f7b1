//! Generic cache-aside repository over the key-value store.
//!
//! `fetch_fresh` is the single entry point for every remote read in the
//! system: success writes through to the store, transport failure serves
//! the cached copy when one exists. A server rejection (structured error
//! response) is never hidden behind cache data.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;

use super::keys;
use crate::api::{ApiFailure, ApiResult};
use crate::core::error::CoreError;
use crate::storage::KeyValueStore;

/// A cached value with the moment it was fetched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub value: T,
    pub fetched_at: DateTime<Utc>,
}

/// Where a successful read's value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    /// Straight from the remote API
    Fresh,
    /// Served from cache after a transport failure; age in seconds
    Cache { age_seconds: i64 },
}

impl FetchSource {
    pub fn is_stale(&self) -> bool {
        matches!(self, FetchSource::Cache { .. })
    }
}

/// A successfully read value plus its provenance
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub value: T,
    pub source: FetchSource,
}

/// Read/write-through cache over the key-value store
#[derive(Clone)]
pub struct CacheRepository {
    store: Arc<dyn KeyValueStore>,
}

impl CacheRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        CacheRepository { store }
    }

    /// Run the remote fetch; write through on success, fall back to cache
    /// on transport failure. `ttl` applies both to the fallback read here
    /// and to direct `read_cache` calls.
    pub async fn fetch_fresh<T, F>(
        &self,
        user_id: &str,
        key: &str,
        ttl: Option<Duration>,
        fetch: F,
    ) -> Result<Fetched<T>, CoreError>
    where
        T: Serialize + DeserializeOwned,
        F: Future<Output = ApiResult<T>> + Send,
    {
        match fetch.await {
            Ok(value) => {
                // A failed write-through only costs one extra remote read
                // later; the fresh value is still good.
                if let Err(e) = self.write_cache(key, &value).await {
                    warn!("Failed to write cache entry '{key}': {e}");
                }
                if let Err(e) = self.mark_synced(user_id).await {
                    warn!("Failed to bump last_sync for {user_id}: {e}");
                }
                Ok(Fetched {
                    value,
                    source: FetchSource::Fresh,
                })
            }
            Err(ApiFailure::Rejected(err)) => Err(CoreError::Api {
                code: err.code,
                message: err.message,
            }),
            Err(ApiFailure::Transport(reason)) => {
                match self.read_entry::<T>(key, ttl).await? {
                    Some(entry) => {
                        let age_seconds = (Utc::now() - entry.fetched_at).num_seconds();
                        warn!("Serving '{key}' from cache ({age_seconds}s old): {reason}");
                        Ok(Fetched {
                            value: entry.value,
                            source: FetchSource::Cache { age_seconds },
                        })
                    }
                    None => Err(CoreError::NetworkUnavailable {
                        key: key.to_string(),
                        reason,
                    }),
                }
            }
        }
    }

    /// Pure local read. Missing keys and undecodable entries are `None`,
    /// never an error; a TTL-expired entry is treated as absent and deleted.
    pub async fn read_cache<T: DeserializeOwned>(
        &self,
        key: &str,
        ttl: Option<Duration>,
    ) -> Result<Option<T>, CoreError> {
        Ok(self.read_entry(key, ttl).await?.map(|entry| entry.value))
    }

    async fn read_entry<T: DeserializeOwned>(
        &self,
        key: &str,
        ttl: Option<Duration>,
    ) -> Result<Option<CacheEntry<T>>, CoreError> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Dropping undecodable cache entry '{key}': {e}");
                self.store.remove(key).await?;
                return Ok(None);
            }
        };

        if let Some(ttl) = ttl {
            if Utc::now() - entry.fetched_at > ttl {
                debug!("Cache entry '{key}' expired, deleting");
                self.store.remove(key).await?;
                return Ok(None);
            }
        }

        Ok(Some(entry))
    }

    /// Overwrite the entry for `key` with a now-stamped value
    pub async fn write_cache<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let entry = CacheEntry {
            value,
            fetched_at: Utc::now(),
        };
        self.store.set(key, &serde_json::to_string(&entry)?).await
    }

    /// Remove one entry; removing an absent entry is a no-op
    pub async fn invalidate(&self, key: &str) -> Result<()> {
        self.store.remove(key).await
    }

    /// Remove several entries in one call
    pub async fn invalidate_many(&self, keys: &[String]) -> Result<()> {
        self.store.remove_many(keys).await
    }

    /// Bulk-clear every key starting with `prefix` (full cache reset,
    /// sign-out, diagnostics)
    pub async fn clear_prefix(&self, prefix: &str) -> Result<usize> {
        let matching: Vec<String> = self
            .store
            .get_all_keys()
            .await?
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .collect();
        let count = matching.len();
        self.store.remove_many(&matching).await?;
        Ok(count)
    }

    /// Diagnostics-only marker of the last successful fetch for a user.
    /// Never consulted for correctness decisions.
    pub async fn mark_synced(&self, user_id: &str) -> Result<()> {
        self.store
            .set(&keys::last_sync(user_id), &Utc::now().to_rfc3339())
            .await
    }

    /// When the user's data last synced, if it ever did
    pub async fn last_synced(&self, user_id: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .store
            .get(&keys::last_sync(user_id))
            .await?
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|dt| dt.with_timezone(&Utc)))
    }
}
