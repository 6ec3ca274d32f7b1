// Core layer - shared types, configuration, and errors
pub mod core;

// Features layer - offline cache, reminders, alerts, domain services
pub mod features;

// Infrastructure - key-value storage and the remote schedule API
pub mod api;
pub mod storage;

// Platform layer - device timers, audio, notifications
pub mod platform;

// Shared test fakes
#[cfg(test)]
pub mod testutil;

// Re-export core config for convenience
pub use crate::core::Config;

// Re-export feature items
pub use features::{
    // Alerts
    AlertManager,
    // Cache
    CacheRepository, Fetched, FetchSource,
    // Invalidation
    Invalidator, Mutation, MutationPipeline,
    // Domain services
    MedicineService, ScheduleService, SearchService, StatsService, WarningService,
    // Reminders
    ReconcileReport, ReminderScheduler,
};
