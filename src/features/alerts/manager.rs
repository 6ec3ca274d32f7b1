//! Alert resource manager.
//!
//! At most one alert session exists process-wide. Starting a new one always
//! tears down the old one first, and teardown failures force the slot empty
//! anyway, so the single-session invariant holds even when the audio layer
//! misbehaves.

use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core::models::ReminderPayload;
use crate::platform::AudioBackend;

/// Sound played for every reminder
pub const ALERT_RESOURCE: &str = "reminder_alarm";

/// The one live playing sound, when there is one
#[derive(Debug)]
struct AlertSession {
    audio_handle: u64,
    intake_event_id: String,
}

/// Owns the alert session slot
pub struct AlertManager {
    audio: Arc<dyn AudioBackend>,
    session: Mutex<Option<AlertSession>>,
}

impl AlertManager {
    pub fn new(audio: Arc<dyn AudioBackend>) -> Self {
        AlertManager {
            audio,
            session: Mutex::new(None),
        }
    }

    /// A reminder timer fired: stop whatever is playing, then start the
    /// looping alert for this event.
    pub async fn reminder_fired(&self, payload: &ReminderPayload) {
        let mut slot = self.session.lock().await;
        Self::teardown(&self.audio, &mut slot).await;

        let handle = match self.audio.load(ALERT_RESOURCE).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Failed to load alert sound: {e}");
                return;
            }
        };

        if let Err(e) = self.audio.start(handle, true).await {
            warn!("Failed to start alert sound: {e}");
            // the handle was loaded; never leak it
            if let Err(e) = self.audio.release(handle).await {
                warn!("Failed to release alert sound after start failure: {e}");
            }
            return;
        }

        info!(
            "Alert playing for event {} ({})",
            payload.intake_event_id, payload.medicine_name
        );
        *slot = Some(AlertSession {
            audio_handle: handle,
            intake_event_id: payload.intake_event_id.clone(),
        });
    }

    /// The user acted on the reminder (a dedicated acknowledge action, not
    /// merely viewing it). No-op when nothing is playing.
    pub async fn user_acknowledged(&self) {
        let mut slot = self.session.lock().await;
        if slot.is_some() {
            Self::teardown(&self.audio, &mut slot).await;
            debug!("Alert acknowledged");
        }
    }

    /// Force-stop regardless of state; used when all reminders are
    /// cancelled en masse.
    pub async fn reset(&self) {
        let mut slot = self.session.lock().await;
        Self::teardown(&self.audio, &mut slot).await;
    }

    /// Whether an alert is currently playing
    pub async fn is_playing(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Audio handle of the live session, for diagnostics and tests
    pub async fn current_handle(&self) -> Option<u64> {
        self.session.lock().await.as_ref().map(|s| s.audio_handle)
    }

    /// Stop and release the session in `slot`, if any. The slot is empty
    /// afterwards no matter what the audio layer returned.
    async fn teardown(audio: &Arc<dyn AudioBackend>, slot: &mut Option<AlertSession>) {
        if let Some(session) = slot.take() {
            if let Err(e) = audio.stop(session.audio_handle).await {
                warn!(
                    "Failed to stop alert for event {}: {e}",
                    session.intake_event_id
                );
            }
            if let Err(e) = audio.release(session.audio_handle).await {
                warn!(
                    "Failed to release alert for event {}: {e}",
                    session.intake_event_id
                );
            }
        }
    }
}
