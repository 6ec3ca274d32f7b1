//! # Feature: Adherence Stats
//!
//! Server-computed adherence numbers, readable offline.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.4.0
//! - **Toggleable**: true

use std::sync::Arc;

use crate::api::ScheduleApi;
use crate::core::error::CoreError;
use crate::core::models::AdherenceStats;
use crate::features::cache::{keys, CacheRepository, Fetched};

/// Domain service for adherence statistics
pub struct StatsService {
    repo: CacheRepository,
    api: Arc<dyn ScheduleApi>,
}

impl StatsService {
    pub fn new(repo: CacheRepository, api: Arc<dyn ScheduleApi>) -> Self {
        StatsService { repo, api }
    }

    /// Adherence for a reporting period ("week", "month", ...). Stats are
    /// read-only here, so the cache entry lives until the next fetch
    /// overwrites it.
    pub async fn adherence(
        &self,
        user_id: &str,
        period: &str,
    ) -> Result<Fetched<AdherenceStats>, CoreError> {
        self.repo
            .fetch_fresh(
                user_id,
                &keys::stats(user_id, period),
                None,
                self.api.adherence_stats(user_id, period),
            )
            .await
    }
}
