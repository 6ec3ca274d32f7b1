//! Reminder scheduler.
//!
//! Keeps the set of armed device timers equal to the future intake events
//! within the lookahead window that are still scheduled. Reconcile is a
//! full teardown-and-rearm: the event set is small, re-arming is cheap, and
//! any interleaving of racing reconciles converges because both compute the
//! same manifest from the same input.

use anyhow::Result;
use chrono::Utc;
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use super::manifest::{self, ScheduledReminder};
use crate::api::ScheduleApi;
use crate::core::error::CoreError;
use crate::core::models::{IntakeStatus, ReminderPayload};
use crate::features::alerts::AlertManager;
use crate::features::cache::{keys, CacheRepository, FetchSource};
use crate::platform::{AlarmBackend, Notifier};
use crate::storage::KeyValueStore;

/// Outcome of one reconcile pass
#[derive(Debug, Clone, Copy)]
pub struct ReconcileReport {
    /// Timers armed by this pass
    pub armed: usize,
    /// Events dropped because their time had already passed
    pub skipped_past: usize,
    /// Whether the event list came from the network or the cache
    pub source: FetchSource,
    /// False when the platform refused alert permission (nothing armed)
    pub permission_granted: bool,
}

/// Owns the armed-timer set and the persisted manifest
pub struct ReminderScheduler {
    repo: CacheRepository,
    api: Arc<dyn ScheduleApi>,
    alarms: Arc<dyn AlarmBackend>,
    alerts: Arc<AlertManager>,
    store: Arc<dyn KeyValueStore>,
    lookahead_hours: u32,
}

impl ReminderScheduler {
    pub fn new(
        repo: CacheRepository,
        api: Arc<dyn ScheduleApi>,
        alarms: Arc<dyn AlarmBackend>,
        alerts: Arc<AlertManager>,
        store: Arc<dyn KeyValueStore>,
        lookahead_hours: u32,
    ) -> Self {
        ReminderScheduler {
            repo,
            api,
            alarms,
            alerts,
            store,
            lookahead_hours,
        }
    }

    /// Bring armed timers in line with the latest known schedule.
    ///
    /// Fetch happens before teardown: when the fetch fails outright (no
    /// network, no cache) the previously armed timers survive untouched and
    /// the caller retries on the next trigger.
    pub async fn reconcile(&self, user_id: &str) -> Result<ReconcileReport, CoreError> {
        let fetched = self
            .repo
            .fetch_fresh(
                user_id,
                &keys::upcoming(user_id),
                None,
                self.api.upcoming_intakes(user_id, self.lookahead_hours),
            )
            .await?;

        // Full teardown, awaited before any new timer is armed so a stale
        // timer can never fire after its replacement exists.
        self.alarms.cancel_all().await;

        if !self.alarms.request_permission().await {
            warn!("Alert permission denied; arming no reminders for {user_id}");
            manifest::replace(self.store.as_ref(), user_id, &[]).await?;
            return Ok(ReconcileReport {
                armed: 0,
                skipped_past: 0,
                source: fetched.source,
                permission_granted: false,
            });
        }

        let now = Utc::now();
        let mut seen: HashSet<String> = HashSet::new();
        let mut reminders: Vec<ScheduledReminder> = Vec::new();
        let mut skipped_past = 0;

        for event in &fetched.value {
            if event.status != IntakeStatus::Scheduled {
                continue;
            }
            if !seen.insert(event.id.clone()) {
                continue;
            }

            let millis_until = (event.scheduled_at - now).num_milliseconds();
            if millis_until <= 0 {
                // Past-due events are the server's "missed" responsibility
                skipped_past += 1;
                continue;
            }

            let payload = ReminderPayload {
                intake_event_id: event.id.clone(),
                medicine_name: event.medicine_name.clone(),
                dosage_text: event.dosage_text(),
                food_instruction: event.food_instruction.map(|f| f.label().to_string()),
            };

            let handle = self
                .alarms
                .schedule_one_shot(Duration::from_millis(millis_until as u64), payload)
                .await
                .map_err(CoreError::Storage)?;

            reminders.push(ScheduledReminder {
                intake_event_id: event.id.clone(),
                timer_handle: handle,
                medicine_name: event.medicine_name.clone(),
                scheduled_at: event.scheduled_at,
            });
        }

        manifest::replace(self.store.as_ref(), user_id, &reminders).await?;

        info!(
            "Reconciled reminders for {user_id}: {} armed, {} past-due skipped{}",
            reminders.len(),
            skipped_past,
            if fetched.source.is_stale() {
                " (from cache)"
            } else {
                ""
            }
        );

        Ok(ReconcileReport {
            armed: reminders.len(),
            skipped_past,
            source: fetched.source,
            permission_granted: true,
        })
    }

    /// Cancel every reminder and silence any playing alert
    pub async fn cancel_all(&self, user_id: &str) -> Result<()> {
        self.alarms.cancel_all().await;
        self.alerts.reset().await;
        manifest::replace(self.store.as_ref(), user_id, &[]).await?;
        info!("Cancelled all reminders for {user_id}");
        Ok(())
    }

    /// Read-only view of the persisted manifest (diagnostics)
    pub async fn manifest(&self, user_id: &str) -> Result<Vec<ScheduledReminder>> {
        manifest::load(self.store.as_ref(), user_id).await
    }

    /// Record which user the background wake-up reconciles for
    pub async fn set_current_user(&self, user_id: &str) -> Result<()> {
        self.store.set(keys::CURRENT_USER, user_id).await
    }

    /// Forget the background user marker (sign-out)
    pub async fn clear_current_user(&self) -> Result<()> {
        self.store.remove(keys::CURRENT_USER).await
    }
}

/// Periodic background wake-up. Re-reads the durable current-user marker
/// each round; an absent marker is a silent no-op. `interval` is a minimum,
/// not an exact firing schedule.
pub async fn background_reconcile_loop(scheduler: Arc<ReminderScheduler>, interval: Duration) {
    loop {
        tokio::time::sleep(interval).await;

        let user_id = match scheduler.store.get(keys::CURRENT_USER).await {
            Ok(Some(user_id)) => user_id,
            Ok(None) => {
                debug!("No current user marker; background reconcile skipped");
                continue;
            }
            Err(e) => {
                error!("Failed to read current user marker: {e}");
                continue;
            }
        };

        match scheduler.reconcile(&user_id).await {
            Ok(report) => debug!(
                "Background reconcile for {user_id}: {} armed",
                report.armed
            ),
            Err(e) => warn!("Background reconcile for {user_id} failed: {e}"),
        }
    }
}

/// Drains fired timers: start the alert sound and raise the visible
/// notification with the same payload. The manifest entry for a fired timer
/// is left alone; the next reconcile drops it naturally.
pub async fn reminder_dispatch_loop(
    mut fired_rx: mpsc::Receiver<ReminderPayload>,
    alerts: Arc<AlertManager>,
    notifier: Arc<dyn Notifier>,
) {
    while let Some(payload) = fired_rx.recv().await {
        info!(
            "Reminder fired for event {} ({})",
            payload.intake_event_id, payload.medicine_name
        );
        alerts.reminder_fired(&payload).await;
        if let Err(e) = notifier.notify(&payload).await {
            warn!("Failed to raise notification: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::IntakeEvent;
    use crate::platform::{LoggingAudio, TokioAlarms};
    use crate::storage::MemoryStore;
    use crate::testutil::{event_at, FakeApi, RecordingNotifier};

    struct Fixture {
        scheduler: ReminderScheduler,
        api: Arc<FakeApi>,
        alarms: Arc<TokioAlarms>,
        store: Arc<MemoryStore>,
        fired_rx: mpsc::Receiver<ReminderPayload>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let repo = CacheRepository::new(store.clone());
        let api = Arc::new(FakeApi::default());
        let (tx, fired_rx) = mpsc::channel(16);
        let alarms = Arc::new(TokioAlarms::new(tx));
        let alerts = Arc::new(AlertManager::new(Arc::new(LoggingAudio::new())));

        let scheduler = ReminderScheduler::new(
            repo,
            api.clone(),
            alarms.clone(),
            alerts,
            store.clone(),
            24,
        );
        Fixture {
            scheduler,
            api,
            alarms,
            store,
            fired_rx,
        }
    }

    fn set_upcoming(api: &FakeApi, events: Vec<IntakeEvent>) {
        *api.upcoming.lock().unwrap() = events;
    }

    #[tokio::test]
    async fn test_arms_only_future_scheduled_events() {
        let mut fx = fixture();
        set_upcoming(
            &fx.api,
            vec![
                event_at("e1", 3600),
                event_at("e2", -60),
                {
                    let mut e = event_at("e3", 7200);
                    e.status = IntakeStatus::Taken;
                    e
                },
            ],
        );

        let report = fx.scheduler.reconcile("u1").await.unwrap();
        assert_eq!(report.armed, 1);
        assert_eq!(report.skipped_past, 1);
        assert_eq!(report.source, FetchSource::Fresh);
        assert_eq!(fx.alarms.armed_count(), 1);

        let manifest = fx.scheduler.manifest("u1").await.unwrap();
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest[0].intake_event_id, "e1");
        assert!(fx.fired_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let fx = fixture();
        set_upcoming(&fx.api, vec![event_at("e1", 3600), event_at("e2", 5400)]);

        fx.scheduler.reconcile("u1").await.unwrap();
        fx.scheduler.reconcile("u1").await.unwrap();
        let report = fx.scheduler.reconcile("u1").await.unwrap();

        // repeated passes with identical input never accumulate timers
        assert_eq!(report.armed, 2);
        assert_eq!(fx.alarms.armed_count(), 2);
        assert_eq!(fx.scheduler.manifest("u1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_event_ids_arm_once() {
        let fx = fixture();
        set_upcoming(&fx.api, vec![event_at("e1", 3600), event_at("e1", 3600)]);

        let report = fx.scheduler.reconcile("u1").await.unwrap();
        assert_eq!(report.armed, 1);
    }

    #[tokio::test]
    async fn test_schedule_change_replaces_manifest() {
        let fx = fixture();
        set_upcoming(&fx.api, vec![event_at("e1", 3600)]);
        fx.scheduler.reconcile("u1").await.unwrap();

        set_upcoming(&fx.api, vec![event_at("e2", 1800)]);
        fx.scheduler.reconcile("u1").await.unwrap();

        let manifest = fx.scheduler.manifest("u1").await.unwrap();
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest[0].intake_event_id, "e2");
        assert_eq!(fx.alarms.armed_count(), 1);
    }

    #[tokio::test]
    async fn test_permission_denied_arms_zero_without_failing() {
        let fx = fixture();
        set_upcoming(&fx.api, vec![event_at("e1", 3600)]);
        fx.alarms.set_permitted(false);

        let report = fx.scheduler.reconcile("u1").await.unwrap();
        assert_eq!(report.armed, 0);
        assert!(!report.permission_granted);
        assert!(fx.scheduler.manifest("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_offline_with_cache_reconciles_from_cache() {
        let fx = fixture();
        set_upcoming(&fx.api, vec![event_at("e1", 3600)]);
        fx.scheduler.reconcile("u1").await.unwrap();

        fx.api.set_offline(true);
        let report = fx.scheduler.reconcile("u1").await.unwrap();
        assert_eq!(report.armed, 1);
        assert!(report.source.is_stale());
    }

    #[tokio::test]
    async fn test_offline_without_cache_keeps_prior_timers() {
        let fx = fixture();
        set_upcoming(&fx.api, vec![event_at("e1", 3600)]);
        fx.scheduler.reconcile("u1").await.unwrap();
        assert_eq!(fx.alarms.armed_count(), 1);

        // lose both the network and the cached copy
        fx.api.set_offline(true);
        fx.store.remove("upcoming_u1").await.unwrap();

        let err = fx.scheduler.reconcile("u1").await.unwrap_err();
        assert!(matches!(err, CoreError::NetworkUnavailable { .. }));
        // fetch failed before teardown, so the armed timer survived
        assert_eq!(fx.alarms.armed_count(), 1);
    }

    #[tokio::test]
    async fn test_cancel_all_clears_timers_and_manifest() {
        let fx = fixture();
        set_upcoming(&fx.api, vec![event_at("e1", 3600), event_at("e2", 5400)]);
        fx.scheduler.reconcile("u1").await.unwrap();

        fx.scheduler.cancel_all("u1").await.unwrap();
        assert_eq!(fx.alarms.armed_count(), 0);
        assert!(fx.scheduler.manifest("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fired_timer_reaches_dispatch() {
        let mut fx = fixture();
        set_upcoming(&fx.api, vec![event_at_millis("e1", 20)]);

        fx.scheduler.reconcile("u1").await.unwrap();

        let payload = fx.fired_rx.recv().await.unwrap();
        assert_eq!(payload.intake_event_id, "e1");
    }

    #[tokio::test]
    async fn test_dispatch_loop_plays_alert_and_notifies() {
        let (tx, rx) = mpsc::channel(4);
        let alerts = Arc::new(AlertManager::new(Arc::new(LoggingAudio::new())));
        let notifier = Arc::new(RecordingNotifier::default());

        let dispatch = tokio::spawn(reminder_dispatch_loop(
            rx,
            alerts.clone(),
            notifier.clone(),
        ));

        let payload = ReminderPayload {
            intake_event_id: "e1".into(),
            medicine_name: "Metformin".into(),
            dosage_text: "1 tablet".into(),
            food_instruction: None,
        };
        tx.send(payload).await.unwrap();
        drop(tx);
        dispatch.await.unwrap();

        assert!(alerts.is_playing().await);
        assert_eq!(notifier.notified(), vec!["e1".to_string()]);
    }

    /// Like `event_at` but with sub-second resolution for firing tests
    fn event_at_millis(id: &str, millis: i64) -> IntakeEvent {
        let mut event = event_at(id, 1);
        event.scheduled_at = Utc::now() + chrono::Duration::milliseconds(millis);
        event
    }
}
