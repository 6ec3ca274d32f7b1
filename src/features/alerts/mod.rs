//! # Feature: Alert Sound
//!
//! Single-slot owner of the playing reminder sound.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//! - **Toggleable**: false

pub mod manager;

pub use manager::{AlertManager, ALERT_RESOURCE};
