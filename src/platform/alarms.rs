//! # One-Shot Alarm Timers
//!
//! Device-level timer contract plus the tokio implementation used by the
//! tracker process. Fired payloads are pushed into an mpsc channel drained
//! by the reminder dispatch loop; cancellation aborts the sleep task and is
//! safe on handles that already fired or never existed.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: cancel_all awaits task teardown before returning
//! - 1.0.0: Initial release

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::core::models::ReminderPayload;

/// Platform timer service for local reminders
#[async_trait]
pub trait AlarmBackend: Send + Sync {
    /// Ask the platform for permission to raise local alerts. False means
    /// the scheduler must arm nothing.
    async fn request_permission(&self) -> bool;

    /// Arm a one-shot timer; returns an opaque handle usable with `cancel`
    async fn schedule_one_shot(&self, delay: Duration, payload: ReminderPayload) -> Result<u64>;

    /// Cancel a timer. Idempotent: unknown, fired, and already-cancelled
    /// handles are all fine.
    async fn cancel(&self, handle: u64);

    /// Cancel every armed timer. Returns only after all timer tasks are
    /// torn down, so a caller can safely re-arm without racing stale fires.
    async fn cancel_all(&self);
}

/// Tokio-backed alarm timers: one sleeping task per armed reminder
pub struct TokioAlarms {
    tasks: DashMap<u64, JoinHandle<()>>,
    next_handle: AtomicU64,
    fired_tx: mpsc::Sender<ReminderPayload>,
    permitted: AtomicBool,
}

impl TokioAlarms {
    /// `fired_tx` receives the payload of every timer that fires
    pub fn new(fired_tx: mpsc::Sender<ReminderPayload>) -> Self {
        TokioAlarms {
            tasks: DashMap::new(),
            next_handle: AtomicU64::new(1),
            fired_tx,
            permitted: AtomicBool::new(true),
        }
    }

    /// Simulate the platform revoking alert permission (also used by tests)
    pub fn set_permitted(&self, permitted: bool) {
        self.permitted.store(permitted, Ordering::SeqCst);
    }

    /// Number of currently armed timers
    pub fn armed_count(&self) -> usize {
        self.tasks.len()
    }
}

#[async_trait]
impl AlarmBackend for TokioAlarms {
    async fn request_permission(&self) -> bool {
        self.permitted.load(Ordering::SeqCst)
    }

    async fn schedule_one_shot(&self, delay: Duration, payload: ReminderPayload) -> Result<u64> {
        let handle = self.next_handle.fetch_add(1, Ordering::SeqCst);
        let tx = self.fired_tx.clone();

        debug!(
            "Arming timer {} for '{}' in {}s",
            handle,
            payload.medicine_name,
            delay.as_secs()
        );

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(payload).await.is_err() {
                warn!("Timer {handle} fired but the dispatch channel is closed");
            }
        });

        self.tasks.insert(handle, task);
        Ok(handle)
    }

    async fn cancel(&self, handle: u64) {
        if let Some((_, task)) = self.tasks.remove(&handle) {
            task.abort();
            debug!("Cancelled timer {handle}");
        }
    }

    async fn cancel_all(&self) {
        let handles: Vec<u64> = self.tasks.iter().map(|e| *e.key()).collect();
        for handle in handles {
            if let Some((_, task)) = self.tasks.remove(&handle) {
                task.abort();
                // await the abort so no stale timer can fire after we return
                let _ = task.await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(id: &str) -> ReminderPayload {
        ReminderPayload {
            intake_event_id: id.to_string(),
            medicine_name: "Metformin".to_string(),
            dosage_text: "1 tablet".to_string(),
            food_instruction: None,
        }
    }

    #[tokio::test]
    async fn test_timer_fires_with_payload() {
        let (tx, mut rx) = mpsc::channel(8);
        let alarms = TokioAlarms::new(tx);

        alarms
            .schedule_one_shot(Duration::from_millis(10), payload("e1"))
            .await
            .unwrap();

        let fired = rx.recv().await.unwrap();
        assert_eq!(fired.intake_event_id, "e1");
    }

    #[tokio::test]
    async fn test_cancel_prevents_fire() {
        let (tx, mut rx) = mpsc::channel(8);
        let alarms = TokioAlarms::new(tx);

        let handle = alarms
            .schedule_one_shot(Duration::from_millis(50), payload("e1"))
            .await
            .unwrap();
        alarms.cancel(handle).await;
        // cancelling twice is a no-op
        alarms.cancel(handle).await;

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(alarms.armed_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_all_tears_down_everything() {
        let (tx, mut rx) = mpsc::channel(8);
        let alarms = TokioAlarms::new(tx);

        for i in 0..3 {
            alarms
                .schedule_one_shot(Duration::from_millis(50), payload(&format!("e{i}")))
                .await
                .unwrap();
        }
        assert_eq!(alarms.armed_count(), 3);

        alarms.cancel_all().await;
        assert_eq!(alarms.armed_count(), 0);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(rx.try_recv().is_err());
    }
}
