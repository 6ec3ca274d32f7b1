//! Persisted reminder manifest.
//!
//! One opaque JSON blob per user describing every armed timer. Single
//! writer (`reconcile`), any number of readers. Entries for timers that
//! already fired linger until the next reconcile replaces the blob.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::features::cache::keys;
use crate::storage::KeyValueStore;

/// A locally-armed reminder tied to one intake event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledReminder {
    pub intake_event_id: String,
    pub timer_handle: u64,
    pub medicine_name: String,
    pub scheduled_at: DateTime<Utc>,
}

/// Read the manifest; an absent or undecodable blob is an empty manifest
pub async fn load(store: &dyn KeyValueStore, user_id: &str) -> Result<Vec<ScheduledReminder>> {
    let Some(raw) = store.get(&keys::reminder_manifest(user_id)).await? else {
        return Ok(Vec::new());
    };
    Ok(serde_json::from_str(&raw).unwrap_or_default())
}

/// Replace the manifest wholesale
pub async fn replace(
    store: &dyn KeyValueStore,
    user_id: &str,
    reminders: &[ScheduledReminder],
) -> Result<()> {
    store
        .set(
            &keys::reminder_manifest(user_id),
            &serde_json::to_string(reminders)?,
        )
        .await
}
