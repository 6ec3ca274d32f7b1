//! # Platform Module
//!
//! Device-facing contracts: one-shot alarm timers, the shared audio
//! resource, and user-visible notifications. Each is a trait so the
//! scheduler and alert manager can be driven by fakes in tests and by
//! whatever the host platform provides in production.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false

pub mod alarms;
pub mod audio;
pub mod notify;

pub use alarms::{AlarmBackend, TokioAlarms};
pub use audio::{AudioBackend, LoggingAudio};
pub use notify::{LogNotifier, Notifier};
