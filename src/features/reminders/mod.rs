//! # Feature: Reminders
//!
//! Local reminder scheduling: converts server-computed intake schedules
//! into device timers, persists a manifest of what is armed, and dispatches
//! fired timers to the alert sound and a visible notification.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 1.2.0: Background reconcile loop keyed off the current-user marker
//! - 1.1.0: Persisted manifest replaced wholesale on each reconcile
//! - 1.0.0: Initial release

pub mod manifest;
pub mod scheduler;

pub use manifest::ScheduledReminder;
pub use scheduler::{
    background_reconcile_loop, reminder_dispatch_loop, ReconcileReport, ReminderScheduler,
};
