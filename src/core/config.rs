//! # Configuration
//!
//! Environment-driven configuration. The binary loads `.env` via dotenvy
//! before calling [`Config::from_env`]; the library never touches the
//! process environment outside this module.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

use anyhow::{Context as _, Result};
use std::env;

/// Default forward window within which intake events get local reminders
pub const DEFAULT_LOOKAHEAD_HOURS: u32 = 24;

/// Floor for the background re-scheduling interval; the periodic wake-up
/// must never run more often than this
pub const MIN_RESCHEDULE_INTERVAL_HOURS: u32 = 8;

/// Runtime configuration for the tracker process
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the schedule API, e.g. `https://api.example.com/v1`
    pub api_base_url: String,
    /// Path of the sqlite file backing the key-value store
    pub database_path: String,
    /// Reminder lookahead window, in hours
    pub lookahead_hours: u32,
    /// Background reconcile interval, in hours (clamped to the 8h floor)
    pub reschedule_interval_hours: u32,
}

impl Config {
    /// Build a config from environment variables, applying defaults for
    /// everything except the API base URL.
    pub fn from_env() -> Result<Self> {
        let api_base_url = env::var("API_BASE_URL")
            .context("API_BASE_URL must be set")?
            .trim_end_matches('/')
            .to_string();

        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "dosewatch.db".to_string());

        let lookahead_hours = env::var("LOOKAHEAD_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_LOOKAHEAD_HOURS);

        let reschedule_interval_hours = env::var("RESCHEDULE_INTERVAL_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(MIN_RESCHEDULE_INTERVAL_HOURS)
            .max(MIN_RESCHEDULE_INTERVAL_HOURS);

        Ok(Config {
            api_base_url,
            database_path,
            lookahead_hours,
            reschedule_interval_hours,
        })
    }
}
