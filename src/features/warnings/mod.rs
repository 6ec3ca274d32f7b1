//! # Feature: Inventory Warnings
//!
//! Low-inventory list plus the inventory update mutation. Updating
//! inventory invalidates only its own list; it cannot change the shape of
//! future schedules, so no reconcile follows.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.4.0
//! - **Toggleable**: true

use log::info;
use std::sync::Arc;

use crate::api::ScheduleApi;
use crate::core::error::CoreError;
use crate::core::models::InventoryWarning;
use crate::features::cache::{keys, CacheRepository, Fetched};
use crate::features::invalidation::{Mutation, MutationPipeline};

/// Domain service for medicine inventory levels
pub struct WarningService {
    repo: CacheRepository,
    api: Arc<dyn ScheduleApi>,
    pipeline: Arc<MutationPipeline>,
}

impl WarningService {
    pub fn new(
        repo: CacheRepository,
        api: Arc<dyn ScheduleApi>,
        pipeline: Arc<MutationPipeline>,
    ) -> Self {
        WarningService {
            repo,
            api,
            pipeline,
        }
    }

    /// Medicines running low, cache-fallback allowed
    pub async fn low_inventory(
        &self,
        user_id: &str,
    ) -> Result<Fetched<Vec<InventoryWarning>>, CoreError> {
        self.repo
            .fetch_fresh(
                user_id,
                &keys::low_inventory(user_id),
                None,
                self.api.low_inventory(user_id),
            )
            .await
    }

    /// Set the absolute inventory level for a medicine
    pub async fn update_inventory(
        &self,
        user_id: &str,
        medicine_id: &str,
        amount: f64,
    ) -> Result<(), CoreError> {
        self.api
            .update_inventory(user_id, medicine_id, amount)
            .await
            .map_err(|e| CoreError::from_mutation("update_inventory", e))?;

        info!("Inventory for {medicine_id} set to {amount}");
        self.pipeline
            .after(user_id, Mutation::UpdateInventory)
            .await;
        Ok(())
    }
}
