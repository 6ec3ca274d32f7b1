//! # Domain Models
//!
//! Shared domain types for medicines, intake events, and schedules.
//! Everything here round-trips through serde_json because cache entries
//! and the reminder manifest are persisted as JSON blobs.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Added AdherenceStats and MedicineHit for stats/search services
//! - 1.1.0: Added inventory_snapshot to IntakeEvent
//! - 1.0.0: Initial creation

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Status of one expected dose occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntakeStatus {
    /// Dose is expected but has not happened yet
    Scheduled,
    /// Dose was taken (an actual outcome is attached)
    Taken,
    /// Scheduled time passed without the dose being taken
    Missed,
    /// User deliberately skipped the dose
    Skipped,
    /// Owning medicine is paused; no reminder should fire
    Paused,
}

impl std::fmt::Display for IntakeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntakeStatus::Scheduled => write!(f, "scheduled"),
            IntakeStatus::Taken => write!(f, "taken"),
            IntakeStatus::Missed => write!(f, "missed"),
            IntakeStatus::Skipped => write!(f, "skipped"),
            IntakeStatus::Paused => write!(f, "paused"),
        }
    }
}

impl std::str::FromStr for IntakeStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "scheduled" => Ok(IntakeStatus::Scheduled),
            "taken" => Ok(IntakeStatus::Taken),
            "missed" => Ok(IntakeStatus::Missed),
            "skipped" => Ok(IntakeStatus::Skipped),
            "paused" => Ok(IntakeStatus::Paused),
            _ => Err(anyhow::anyhow!("Invalid intake status: {}", s)),
        }
    }
}

/// Relation of a dose to food, when the medicine specifies one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FoodInstruction {
    BeforeFood,
    WithFood,
    AfterFood,
    EmptyStomach,
}

impl FoodInstruction {
    /// Short human-readable annotation for reminder payloads
    pub fn label(&self) -> &'static str {
        match self {
            FoodInstruction::BeforeFood => "before food",
            FoodInstruction::WithFood => "with food",
            FoodInstruction::AfterFood => "after food",
            FoodInstruction::EmptyStomach => "on an empty stomach",
        }
    }
}

/// One expected dose occurrence, produced by the remote schedule expansion.
///
/// Created server-side; the only local mutation is attaching the actual
/// outcome after a take/skip call succeeded remotely. Never deleted locally,
/// only superseded by a re-fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeEvent {
    pub id: String,
    pub medicine_id: String,
    pub medicine_name: String,
    pub scheduled_at: DateTime<Utc>,
    pub dosage_amount: f64,
    pub dosage_unit: String,
    pub status: IntakeStatus,
    /// When the dose was actually taken, if it was
    #[serde(default)]
    pub actual_at: Option<DateTime<Utc>>,
    /// Amount actually taken, if different from scheduled
    #[serde(default)]
    pub actual_amount: Option<f64>,
    #[serde(default)]
    pub food_instruction: Option<FoodInstruction>,
    /// Inventory level of the owning medicine at fetch time
    #[serde(default)]
    pub inventory_snapshot: Option<f64>,
}

impl IntakeEvent {
    /// Dosage as display text, e.g. "2 tablets"
    pub fn dosage_text(&self) -> String {
        format!("{} {}", self.dosage_amount, self.dosage_unit)
    }
}

/// A registered medicine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medicine {
    pub id: String,
    pub name: String,
    pub dosage_amount: f64,
    pub dosage_unit: String,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub food_instruction: Option<FoodInstruction>,
    /// Paused medicines produce no reminders
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub current_inventory: Option<f64>,
}

/// Full schedule for one calendar day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySchedule {
    pub date: NaiveDate,
    pub events: Vec<IntakeEvent>,
}

/// A medicine that is running low on inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryWarning {
    pub medicine_id: String,
    pub medicine_name: String,
    pub remaining: f64,
    /// Server-estimated days until the inventory runs out
    pub days_left: f64,
}

/// Aggregated adherence numbers for a reporting period
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdherenceStats {
    pub taken: u32,
    pub missed: u32,
    pub skipped: u32,
    pub total: u32,
    pub adherence_percent: f64,
}

/// Payload attached to an armed timer and carried into the notification
/// raised when it fires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderPayload {
    pub intake_event_id: String,
    pub medicine_name: String,
    pub dosage_text: String,
    #[serde(default)]
    pub food_instruction: Option<String>,
}

impl ReminderPayload {
    /// Notification body, e.g. "Metformin — 2 tablets (with food)"
    pub fn body(&self) -> String {
        match &self.food_instruction {
            Some(food) => format!("{} - {} ({})", self.medicine_name, self.dosage_text, food),
            None => format!("{} - {}", self.medicine_name, self.dosage_text),
        }
    }
}

/// One result row from a medicine catalogue search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicineHit {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub strength: Option<String>,
    #[serde(default)]
    pub form: Option<String>,
}
