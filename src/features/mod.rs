//! # Features Layer
//!
//! One module per feature. The cache, invalidation, reminders, and alerts
//! modules are the offline/alerting core; the remaining modules are the
//! domain services built on top of them.

pub mod alerts;
pub mod cache;
pub mod invalidation;
pub mod medicines;
pub mod reminders;
pub mod schedule;
pub mod search;
pub mod stats;
pub mod warnings;

pub use alerts::AlertManager;
pub use cache::{CacheEntry, CacheRepository, Fetched, FetchSource};
pub use invalidation::{Invalidator, Mutation, MutationPipeline};
pub use medicines::MedicineService;
pub use reminders::{ReconcileReport, ReminderScheduler, ScheduledReminder};
pub use schedule::ScheduleService;
pub use search::SearchService;
pub use stats::StatsService;
pub use warnings::WarningService;
