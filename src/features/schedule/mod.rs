//! # Feature: Intake Schedule
//!
//! Read side of the expanded schedule (daily, upcoming, overdue) and the
//! take/skip/mark-missed mutations. The server owns recurrence expansion
//! and the authoritative inventory decrement; the client-side inventory
//! check before a take is advisory only.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Advisory inventory pre-check logged before take_dose
//! - 1.1.0: Overdue list added
//! - 1.0.0: Initial release

use chrono::NaiveDate;
use log::{info, warn};
use std::sync::Arc;

use crate::api::{ScheduleApi, TakeDoseRequest};
use crate::core::error::CoreError;
use crate::core::models::{DailySchedule, IntakeEvent};
use crate::features::cache::{keys, CacheRepository, Fetched};
use crate::features::invalidation::{Mutation, MutationPipeline};

/// Domain service for intake events
pub struct ScheduleService {
    repo: CacheRepository,
    api: Arc<dyn ScheduleApi>,
    pipeline: Arc<MutationPipeline>,
}

impl ScheduleService {
    pub fn new(
        repo: CacheRepository,
        api: Arc<dyn ScheduleApi>,
        pipeline: Arc<MutationPipeline>,
    ) -> Self {
        ScheduleService {
            repo,
            api,
            pipeline,
        }
    }

    /// The full schedule for one day, cache-fallback allowed
    pub async fn daily_schedule(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Fetched<DailySchedule>, CoreError> {
        self.repo
            .fetch_fresh(
                user_id,
                &keys::daily_schedule(user_id, date),
                None,
                self.api.daily_schedule(user_id, date),
            )
            .await
    }

    /// Upcoming intake events within `hours` from now
    pub async fn upcoming(
        &self,
        user_id: &str,
        hours: u32,
    ) -> Result<Fetched<Vec<IntakeEvent>>, CoreError> {
        self.repo
            .fetch_fresh(
                user_id,
                &keys::upcoming(user_id),
                None,
                self.api.upcoming_intakes(user_id, hours),
            )
            .await
    }

    /// Events whose scheduled time passed while still unresolved
    pub async fn overdue(&self, user_id: &str) -> Result<Fetched<Vec<IntakeEvent>>, CoreError> {
        self.repo
            .fetch_fresh(
                user_id,
                &keys::overdue(user_id),
                None,
                self.api.overdue_intakes(user_id),
            )
            .await
    }

    /// Record a dose as taken. The returned event carries the attached
    /// actual outcome.
    pub async fn take_dose(
        &self,
        user_id: &str,
        event_id: &str,
        request: &TakeDoseRequest,
    ) -> Result<IntakeEvent, CoreError> {
        if request.deduct_from_inventory {
            self.advisory_inventory_check(user_id, event_id, request).await;
        }

        let event = self
            .api
            .take_dose(user_id, event_id, request)
            .await
            .map_err(|e| CoreError::from_mutation("take_dose", e))?;

        info!("Dose taken for event {event_id}");
        self.pipeline.after(user_id, Mutation::TakeDose).await;
        Ok(event)
    }

    pub async fn skip_dose(&self, user_id: &str, event_id: &str) -> Result<IntakeEvent, CoreError> {
        let event = self
            .api
            .skip_dose(user_id, event_id)
            .await
            .map_err(|e| CoreError::from_mutation("skip_dose", e))?;

        info!("Dose skipped for event {event_id}");
        self.pipeline.after(user_id, Mutation::SkipDose).await;
        Ok(event)
    }

    pub async fn mark_missed(
        &self,
        user_id: &str,
        event_id: &str,
    ) -> Result<IntakeEvent, CoreError> {
        let event = self
            .api
            .mark_missed(user_id, event_id)
            .await
            .map_err(|e| CoreError::from_mutation("mark_missed", e))?;

        self.pipeline.after(user_id, Mutation::MarkMissed).await;
        Ok(event)
    }

    /// Warn when the cached inventory snapshot looks too small for the
    /// requested deduction. Advisory only: the request is sent regardless
    /// and the server's decision is final.
    async fn advisory_inventory_check(
        &self,
        user_id: &str,
        event_id: &str,
        request: &TakeDoseRequest,
    ) {
        let cached: Option<Vec<IntakeEvent>> = self
            .repo
            .read_cache(&keys::upcoming(user_id), None)
            .await
            .unwrap_or(None);

        let Some(event) = cached
            .as_deref()
            .and_then(|events| events.iter().find(|e| e.id == event_id))
        else {
            return;
        };

        let amount = request.amount.unwrap_or(event.dosage_amount);
        if let Some(snapshot) = event.inventory_snapshot {
            if snapshot < amount {
                warn!(
                    "Inventory snapshot for event {event_id} is {snapshot}, below the {amount} \
                     requested; deferring to the server"
                );
            }
        }
    }
}
