//! Shared test fakes, injected through the same constructors production
//! uses. Compiled only for tests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::api::{ApiError, ApiFailure, ApiResult, MedicineUpsert, ScheduleApi, TakeDoseRequest};
use crate::core::models::{
    AdherenceStats, DailySchedule, IntakeEvent, IntakeStatus, InventoryWarning, Medicine,
    MedicineHit, ReminderPayload,
};
use crate::platform::Notifier;

/// A scheduled intake event `offset_seconds` from now
pub fn event_at(id: &str, offset_seconds: i64) -> IntakeEvent {
    IntakeEvent {
        id: id.to_string(),
        medicine_id: format!("med_{id}"),
        medicine_name: "Metformin".to_string(),
        scheduled_at: Utc::now() + chrono::Duration::seconds(offset_seconds),
        dosage_amount: 1.0,
        dosage_unit: "tablet".to_string(),
        status: IntakeStatus::Scheduled,
        actual_at: None,
        actual_amount: None,
        food_instruction: None,
        inventory_snapshot: None,
    }
}

pub fn medicine(id: &str, name: &str) -> Medicine {
    Medicine {
        id: id.to_string(),
        name: name.to_string(),
        dosage_amount: 1.0,
        dosage_unit: "tablet".to_string(),
        instructions: None,
        food_instruction: None,
        paused: false,
        current_inventory: Some(30.0),
    }
}

/// Scripted schedule API. Reads return the stored fixtures; mutations are
/// recorded and echo back a plausible event. `offline` turns every call
/// into a transport failure, `rejection` makes mutations fail with a
/// structured error.
#[derive(Default)]
pub struct FakeApi {
    pub upcoming: Mutex<Vec<IntakeEvent>>,
    pub overdue: Mutex<Vec<IntakeEvent>>,
    pub daily: Mutex<Vec<IntakeEvent>>,
    pub medicines: Mutex<Vec<Medicine>>,
    pub warnings: Mutex<Vec<InventoryWarning>>,
    pub stats: Mutex<AdherenceStats>,
    pub hits: Mutex<Vec<MedicineHit>>,
    pub calls: Mutex<Vec<String>>,
    offline: AtomicBool,
    rejection: Mutex<Option<ApiError>>,
}

impl FakeApi {
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_rejection(&self, error: Option<ApiError>) {
        *self.rejection.lock().unwrap() = error;
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn guard(&self, call: &str) -> ApiResult<()> {
        self.calls.lock().unwrap().push(call.to_string());
        if self.offline.load(Ordering::SeqCst) {
            return Err(ApiFailure::Transport("offline".to_string()));
        }
        if let Some(error) = self.rejection.lock().unwrap().clone() {
            return Err(ApiFailure::Rejected(error));
        }
        Ok(())
    }

    fn echo_event(&self, event_id: &str, status: IntakeStatus) -> IntakeEvent {
        let mut event = self
            .upcoming
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id == event_id)
            .cloned()
            .unwrap_or_else(|| event_at(event_id, 0));
        event.status = status;
        event
    }
}

#[async_trait]
impl ScheduleApi for FakeApi {
    async fn upcoming_intakes(&self, _user_id: &str, _hours: u32) -> ApiResult<Vec<IntakeEvent>> {
        self.guard("upcoming_intakes")?;
        Ok(self.upcoming.lock().unwrap().clone())
    }

    async fn daily_schedule(&self, _user_id: &str, date: NaiveDate) -> ApiResult<DailySchedule> {
        self.guard("daily_schedule")?;
        Ok(DailySchedule {
            date,
            events: self.daily.lock().unwrap().clone(),
        })
    }

    async fn overdue_intakes(&self, _user_id: &str) -> ApiResult<Vec<IntakeEvent>> {
        self.guard("overdue_intakes")?;
        Ok(self.overdue.lock().unwrap().clone())
    }

    async fn list_medicines(&self, _user_id: &str) -> ApiResult<Vec<Medicine>> {
        self.guard("list_medicines")?;
        Ok(self.medicines.lock().unwrap().clone())
    }

    async fn create_medicine(
        &self,
        _user_id: &str,
        upsert: &MedicineUpsert,
    ) -> ApiResult<Medicine> {
        self.guard("create_medicine")?;
        Ok(Medicine {
            id: format!("med_{}", self.calls.lock().unwrap().len()),
            name: upsert.name.clone(),
            dosage_amount: upsert.dosage_amount,
            dosage_unit: upsert.dosage_unit.clone(),
            instructions: upsert.instructions.clone(),
            food_instruction: None,
            paused: false,
            current_inventory: upsert.current_inventory,
        })
    }

    async fn update_medicine(
        &self,
        _user_id: &str,
        medicine_id: &str,
        upsert: &MedicineUpsert,
    ) -> ApiResult<Medicine> {
        self.guard("update_medicine")?;
        Ok(Medicine {
            id: medicine_id.to_string(),
            name: upsert.name.clone(),
            dosage_amount: upsert.dosage_amount,
            dosage_unit: upsert.dosage_unit.clone(),
            instructions: upsert.instructions.clone(),
            food_instruction: None,
            paused: false,
            current_inventory: upsert.current_inventory,
        })
    }

    async fn delete_medicine(&self, _user_id: &str, _medicine_id: &str) -> ApiResult<()> {
        self.guard("delete_medicine")
    }

    async fn pause_medicine(&self, _user_id: &str, _medicine_id: &str) -> ApiResult<()> {
        self.guard("pause_medicine")
    }

    async fn resume_medicine(&self, _user_id: &str, _medicine_id: &str) -> ApiResult<()> {
        self.guard("resume_medicine")
    }

    async fn take_dose(
        &self,
        _user_id: &str,
        event_id: &str,
        _request: &TakeDoseRequest,
    ) -> ApiResult<IntakeEvent> {
        self.guard("take_dose")?;
        Ok(self.echo_event(event_id, IntakeStatus::Taken))
    }

    async fn skip_dose(&self, _user_id: &str, event_id: &str) -> ApiResult<IntakeEvent> {
        self.guard("skip_dose")?;
        Ok(self.echo_event(event_id, IntakeStatus::Skipped))
    }

    async fn mark_missed(&self, _user_id: &str, event_id: &str) -> ApiResult<IntakeEvent> {
        self.guard("mark_missed")?;
        Ok(self.echo_event(event_id, IntakeStatus::Missed))
    }

    async fn update_inventory(
        &self,
        _user_id: &str,
        _medicine_id: &str,
        _amount: f64,
    ) -> ApiResult<()> {
        self.guard("update_inventory")
    }

    async fn low_inventory(&self, _user_id: &str) -> ApiResult<Vec<InventoryWarning>> {
        self.guard("low_inventory")?;
        Ok(self.warnings.lock().unwrap().clone())
    }

    async fn adherence_stats(&self, _user_id: &str, _period: &str) -> ApiResult<AdherenceStats> {
        self.guard("adherence_stats")?;
        Ok(self.stats.lock().unwrap().clone())
    }

    async fn search_medicines(&self, _query: &str) -> ApiResult<Vec<MedicineHit>> {
        self.guard("search_medicines")?;
        Ok(self.hits.lock().unwrap().clone())
    }
}

/// Notifier that records which events it was asked to announce
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn notified(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, payload: &ReminderPayload) -> Result<()> {
        self.events
            .lock()
            .unwrap()
            .push(payload.intake_event_id.clone());
        Ok(())
    }
}
