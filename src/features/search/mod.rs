//! # Feature: Medicine Search
//!
//! Catalogue search with a short-lived cache. Search results are the one
//! entity class with a TTL: a hit older than fifteen minutes is treated as
//! never fetched.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.4.0
//! - **Toggleable**: true

use chrono::Duration;
use std::sync::Arc;

use crate::api::ScheduleApi;
use crate::core::error::CoreError;
use crate::core::models::MedicineHit;
use crate::features::cache::{keys, CacheRepository, Fetched};

/// How long a cached search result stays servable
pub const SEARCH_TTL_MINUTES: i64 = 15;

/// Domain service for catalogue search
pub struct SearchService {
    repo: CacheRepository,
    api: Arc<dyn ScheduleApi>,
}

impl SearchService {
    pub fn new(repo: CacheRepository, api: Arc<dyn ScheduleApi>) -> Self {
        SearchService { repo, api }
    }

    /// Search the medicine catalogue, serving a recent cached result when
    /// the network is down
    pub async fn search(
        &self,
        user_id: &str,
        query: &str,
    ) -> Result<Fetched<Vec<MedicineHit>>, CoreError> {
        let normalized = query.trim().to_lowercase();
        self.repo
            .fetch_fresh(
                user_id,
                &keys::search(user_id, &normalized),
                Some(Duration::minutes(SEARCH_TTL_MINUTES)),
                self.api.search_medicines(&normalized),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::cache::CacheEntry;
    use crate::storage::{KeyValueStore, MemoryStore};
    use crate::testutil::FakeApi;
    use chrono::Utc;

    #[tokio::test]
    async fn test_offline_search_within_ttl_serves_cache() {
        let api = Arc::new(FakeApi::default());
        let store = Arc::new(MemoryStore::new());
        *api.hits.lock().unwrap() = vec![MedicineHit {
            id: "m1".into(),
            name: "Aspirin".into(),
            strength: None,
            form: None,
        }];
        let service = SearchService::new(CacheRepository::new(store.clone()), api.clone());

        service.search("u1", "Aspirin ").await.unwrap();

        api.set_offline(true);
        let cached = service.search("u1", "aspirin").await.unwrap();
        assert!(cached.source.is_stale());
        assert_eq!(cached.value[0].name, "Aspirin");
    }

    #[tokio::test]
    async fn test_expired_search_entry_is_a_miss() {
        let api = Arc::new(FakeApi::default());
        let store = Arc::new(MemoryStore::new());
        let service = SearchService::new(CacheRepository::new(store.clone()), api.clone());

        // cached at t=0, read at t=16min
        let entry = CacheEntry {
            value: vec![MedicineHit {
                id: "m1".into(),
                name: "Aspirin".into(),
                strength: None,
                form: None,
            }],
            fetched_at: Utc::now() - Duration::minutes(16),
        };
        store
            .set("search_u1_aspirin", &serde_json::to_string(&entry).unwrap())
            .await
            .unwrap();

        api.set_offline(true);
        let err = service.search("u1", "aspirin").await.unwrap_err();
        assert!(matches!(err, CoreError::NetworkUnavailable { .. }));
        // the expired entry was proactively deleted
        assert_eq!(store.get("search_u1_aspirin").await.unwrap(), None);
    }
}
