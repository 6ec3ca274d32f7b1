//! # Audio Resource Contract
//!
//! Load/start/stop/release lifecycle for the alert sound. The alert
//! manager guarantees at most one held handle; this layer only moves
//! individual handles through their lifecycle.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use std::sync::atomic::{AtomicU64, Ordering};

/// Platform audio service
#[async_trait]
pub trait AudioBackend: Send + Sync {
    /// Load a sound resource, returning a playable handle
    async fn load(&self, resource: &str) -> Result<u64>;

    /// Start playback, optionally looping until stopped
    async fn start(&self, handle: u64, looping: bool) -> Result<()>;

    /// Stop playback; stopping a stopped handle is a no-op
    async fn stop(&self, handle: u64) -> Result<()>;

    /// Free the underlying resource. The handle is dead afterwards.
    async fn release(&self, handle: u64) -> Result<()>;
}

/// Stand-in backend for headless runs: logs the lifecycle instead of
/// playing anything. Handles are still unique so the single-session
/// invariant stays observable.
#[derive(Default)]
pub struct LoggingAudio {
    next_handle: AtomicU64,
}

impl LoggingAudio {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AudioBackend for LoggingAudio {
    async fn load(&self, resource: &str) -> Result<u64> {
        let handle = self.next_handle.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Loaded audio resource '{resource}' as handle {handle}");
        Ok(handle)
    }

    async fn start(&self, handle: u64, looping: bool) -> Result<()> {
        info!("Audio {handle} started (looping: {looping})");
        Ok(())
    }

    async fn stop(&self, handle: u64) -> Result<()> {
        info!("Audio {handle} stopped");
        Ok(())
    }

    async fn release(&self, handle: u64) -> Result<()> {
        info!("Audio {handle} released");
        Ok(())
    }
}
