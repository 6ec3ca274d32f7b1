//! User-visible notification contract.

use anyhow::Result;
use async_trait::async_trait;
use log::info;

use crate::core::models::ReminderPayload;

/// Raises a visible notification for a fired reminder
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, payload: &ReminderPayload) -> Result<()>;
}

/// Headless notifier: writes the notification to the log
#[derive(Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        LogNotifier
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, payload: &ReminderPayload) -> Result<()> {
        info!("Time to take your medicine: {}", payload.body());
        Ok(())
    }
}
