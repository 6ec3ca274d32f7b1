//! # Core Module
//!
//! Core domain types, configuration, and error handling for the adherence
//! tracker.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Add error module with the CoreError taxonomy
//! - 1.1.0: Add models module with shared domain types
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used items
pub use config::Config;
pub use error::CoreError;
pub use models::{
    AdherenceStats, DailySchedule, FoodInstruction, IntakeEvent, IntakeStatus, InventoryWarning,
    Medicine, MedicineHit, ReminderPayload,
};
