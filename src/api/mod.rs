//! # Schedule API
//!
//! Contract for the remote schedule source. The server owns recurrence
//! expansion ("every other day", cycle-based schedules, ...) and the
//! authoritative inventory; this client never computes a schedule itself.
//!
//! Transport failures and server rejections are kept apart on purpose: a
//! transport failure is allowed to fall back to cache, a structured server
//! rejection never is.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Split ApiFailure into Transport and Rejected variants
//! - 1.0.0: Initial release with the reqwest-backed client

pub mod client;

pub use client::HttpScheduleApi;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::models::{
    AdherenceStats, DailySchedule, IntakeEvent, InventoryWarning, Medicine, MedicineHit,
};

/// Structured error body returned by every mutation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
    pub code: u16,
}

/// Why an API call failed
#[derive(Debug)]
pub enum ApiFailure {
    /// Could not reach the server (connect, timeout, bad gateway). Cache
    /// fallback applies.
    Transport(String),
    /// The server answered and said no. Cache fallback does not apply.
    Rejected(ApiError),
}

impl std::fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiFailure::Transport(reason) => write!(f, "transport failure: {reason}"),
            ApiFailure::Rejected(err) => write!(f, "rejected ({}): {}", err.code, err.message),
        }
    }
}

impl std::error::Error for ApiFailure {}

pub type ApiResult<T> = Result<T, ApiFailure>;

/// Fields a medicine create/update sends to the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicineUpsert {
    pub name: String,
    pub dosage_amount: f64,
    pub dosage_unit: String,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub current_inventory: Option<f64>,
}

/// Body of a take-dose mutation.
///
/// `deduct_from_inventory` is a request, not a command: the server owns the
/// decrement and may refuse it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TakeDoseRequest {
    pub taken_at: DateTime<Utc>,
    #[serde(default)]
    pub amount: Option<f64>,
    pub deduct_from_inventory: bool,
}

/// Remote schedule source. Every method is a network round-trip.
#[async_trait]
pub trait ScheduleApi: Send + Sync {
    async fn upcoming_intakes(&self, user_id: &str, hours: u32) -> ApiResult<Vec<IntakeEvent>>;
    async fn daily_schedule(&self, user_id: &str, date: NaiveDate) -> ApiResult<DailySchedule>;
    async fn overdue_intakes(&self, user_id: &str) -> ApiResult<Vec<IntakeEvent>>;

    async fn list_medicines(&self, user_id: &str) -> ApiResult<Vec<Medicine>>;
    async fn create_medicine(&self, user_id: &str, medicine: &MedicineUpsert)
        -> ApiResult<Medicine>;
    async fn update_medicine(
        &self,
        user_id: &str,
        medicine_id: &str,
        medicine: &MedicineUpsert,
    ) -> ApiResult<Medicine>;
    async fn delete_medicine(&self, user_id: &str, medicine_id: &str) -> ApiResult<()>;
    async fn pause_medicine(&self, user_id: &str, medicine_id: &str) -> ApiResult<()>;
    async fn resume_medicine(&self, user_id: &str, medicine_id: &str) -> ApiResult<()>;

    async fn take_dose(
        &self,
        user_id: &str,
        event_id: &str,
        request: &TakeDoseRequest,
    ) -> ApiResult<IntakeEvent>;
    async fn skip_dose(&self, user_id: &str, event_id: &str) -> ApiResult<IntakeEvent>;
    async fn mark_missed(&self, user_id: &str, event_id: &str) -> ApiResult<IntakeEvent>;

    async fn update_inventory(
        &self,
        user_id: &str,
        medicine_id: &str,
        amount: f64,
    ) -> ApiResult<()>;
    async fn low_inventory(&self, user_id: &str) -> ApiResult<Vec<InventoryWarning>>;

    async fn adherence_stats(&self, user_id: &str, period: &str) -> ApiResult<AdherenceStats>;
    async fn search_medicines(&self, query: &str) -> ApiResult<Vec<MedicineHit>>;
}
