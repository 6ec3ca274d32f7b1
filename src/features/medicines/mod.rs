//! # Feature: Medicines
//!
//! Medicine CRUD plus pause/resume, offline-readable through the cache
//! layer. Every successful mutation runs the invalidation pipeline, and
//! because all of these can change the shape of future schedules, a
//! reminder reconcile follows.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.3.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Pause/resume routed through the mutation pipeline
//! - 1.0.0: Initial release

use log::info;
use std::sync::Arc;

use crate::api::{MedicineUpsert, ScheduleApi};
use crate::core::error::CoreError;
use crate::core::models::Medicine;
use crate::features::cache::{keys, CacheRepository, Fetched};
use crate::features::invalidation::{Mutation, MutationPipeline};

/// Domain service for registered medicines
pub struct MedicineService {
    repo: CacheRepository,
    api: Arc<dyn ScheduleApi>,
    pipeline: Arc<MutationPipeline>,
}

impl MedicineService {
    pub fn new(
        repo: CacheRepository,
        api: Arc<dyn ScheduleApi>,
        pipeline: Arc<MutationPipeline>,
    ) -> Self {
        MedicineService {
            repo,
            api,
            pipeline,
        }
    }

    /// All medicines for a user, cache-fallback allowed
    pub async fn list(&self, user_id: &str) -> Result<Fetched<Vec<Medicine>>, CoreError> {
        self.repo
            .fetch_fresh(
                user_id,
                &keys::medicines(user_id),
                None,
                self.api.list_medicines(user_id),
            )
            .await
    }

    pub async fn create(
        &self,
        user_id: &str,
        upsert: &MedicineUpsert,
    ) -> Result<Medicine, CoreError> {
        let medicine = self
            .api
            .create_medicine(user_id, upsert)
            .await
            .map_err(|e| CoreError::from_mutation("create_medicine", e))?;
        info!("Created medicine {} ({})", medicine.id, medicine.name);
        self.pipeline.after(user_id, Mutation::CreateMedicine).await;
        Ok(medicine)
    }

    pub async fn update(
        &self,
        user_id: &str,
        medicine_id: &str,
        upsert: &MedicineUpsert,
    ) -> Result<Medicine, CoreError> {
        let medicine = self
            .api
            .update_medicine(user_id, medicine_id, upsert)
            .await
            .map_err(|e| CoreError::from_mutation("update_medicine", e))?;
        self.pipeline.after(user_id, Mutation::UpdateMedicine).await;
        Ok(medicine)
    }

    pub async fn delete(&self, user_id: &str, medicine_id: &str) -> Result<(), CoreError> {
        self.api
            .delete_medicine(user_id, medicine_id)
            .await
            .map_err(|e| CoreError::from_mutation("delete_medicine", e))?;
        info!("Deleted medicine {medicine_id}");
        self.pipeline.after(user_id, Mutation::DeleteMedicine).await;
        Ok(())
    }

    /// Pause a medicine: its events stop producing reminders
    pub async fn pause(&self, user_id: &str, medicine_id: &str) -> Result<(), CoreError> {
        self.api
            .pause_medicine(user_id, medicine_id)
            .await
            .map_err(|e| CoreError::from_mutation("pause_medicine", e))?;
        self.pipeline.after(user_id, Mutation::PauseMedicine).await;
        Ok(())
    }

    pub async fn resume(&self, user_id: &str, medicine_id: &str) -> Result<(), CoreError> {
        self.api
            .resume_medicine(user_id, medicine_id)
            .await
            .map_err(|e| CoreError::from_mutation("resume_medicine", e))?;
        self.pipeline.after(user_id, Mutation::ResumeMedicine).await;
        Ok(())
    }
}
