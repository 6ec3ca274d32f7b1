//! # Feature: Mutation-Triggered Invalidation
//!
//! The cross-cutting rule set mapping each domain mutation to the cache
//! keys it makes stale. Invalidation runs strictly after the remote call
//! succeeded; invalidating before confirmation could leave a failed
//! mutation looking fresh. Failures here are logged and swallowed: the
//! worst case is one extra stale read before the next natural refresh.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//! - **Toggleable**: false

use chrono::Utc;
use log::{debug, warn};

use super::cache::{keys, CacheRepository};

/// Domain mutations that can make cached reads stale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    TakeDose,
    SkipDose,
    MarkMissed,
    PauseMedicine,
    ResumeMedicine,
    CreateMedicine,
    UpdateMedicine,
    DeleteMedicine,
    UpdateInventory,
}

impl std::fmt::Display for Mutation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Mutation::TakeDose => "take_dose",
            Mutation::SkipDose => "skip_dose",
            Mutation::MarkMissed => "mark_missed",
            Mutation::PauseMedicine => "pause_medicine",
            Mutation::ResumeMedicine => "resume_medicine",
            Mutation::CreateMedicine => "create_medicine",
            Mutation::UpdateMedicine => "update_medicine",
            Mutation::DeleteMedicine => "delete_medicine",
            Mutation::UpdateInventory => "update_inventory",
        };
        write!(f, "{name}")
    }
}

/// The static mutation -> keys table
pub fn keys_for(mutation: Mutation, user_id: &str) -> Vec<String> {
    match mutation {
        Mutation::TakeDose
        | Mutation::SkipDose
        | Mutation::MarkMissed
        | Mutation::PauseMedicine
        | Mutation::ResumeMedicine => vec![
            keys::daily_schedule(user_id, Utc::now().date_naive()),
            keys::upcoming(user_id),
            keys::overdue(user_id),
        ],
        Mutation::CreateMedicine | Mutation::UpdateMedicine | Mutation::DeleteMedicine => {
            vec![keys::medicines(user_id)]
        }
        Mutation::UpdateInventory => vec![keys::low_inventory(user_id)],
    }
}

/// Whether this mutation can change the shape of future schedules, meaning
/// the reminder scheduler must reconcile afterwards
pub fn needs_reconcile(mutation: Mutation) -> bool {
    !matches!(mutation, Mutation::UpdateInventory)
}

/// Applies the invalidation table after confirmed mutations
#[derive(Clone)]
pub struct Invalidator {
    repo: CacheRepository,
}

impl Invalidator {
    pub fn new(repo: CacheRepository) -> Self {
        Invalidator { repo }
    }

    /// Drop the cache entries invalidated by `mutation`. Call only after
    /// the remote mutation succeeded. Returns whether a reconcile is due;
    /// store failures are logged, never surfaced.
    pub async fn apply(&self, user_id: &str, mutation: Mutation) -> bool {
        let keys = keys_for(mutation, user_id);
        debug!("Invalidating {} keys after {mutation} for {user_id}", keys.len());

        if let Err(e) = self.repo.invalidate_many(&keys).await {
            warn!("Cache invalidation after {mutation} failed: {e}");
        }
        needs_reconcile(mutation)
    }
}

/// Invalidate-then-reconcile pipeline every service runs after a confirmed
/// mutation. A reconcile failure here is logged, never surfaced: the
/// mutation already succeeded and the next trigger retries the timers.
pub struct MutationPipeline {
    invalidator: Invalidator,
    scheduler: std::sync::Arc<crate::features::reminders::ReminderScheduler>,
}

impl MutationPipeline {
    pub fn new(
        invalidator: Invalidator,
        scheduler: std::sync::Arc<crate::features::reminders::ReminderScheduler>,
    ) -> Self {
        MutationPipeline {
            invalidator,
            scheduler,
        }
    }

    pub async fn after(&self, user_id: &str, mutation: Mutation) {
        if self.invalidator.apply(user_id, mutation).await {
            if let Err(e) = self.scheduler.reconcile(user_id).await {
                warn!("Reconcile after {mutation} failed (will retry on next trigger): {e}");
            }
        }
    }
}
