//! # Error Taxonomy
//!
//! Typed errors for the offline-capable core. Serving stale cache is NOT an
//! error here; degraded reads are reported through
//! [`FetchSource`](crate::features::cache::FetchSource) on the successful
//! path instead. Audio teardown failures are logged at the call site and
//! never reach this type.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false

use thiserror::Error;

/// Errors surfaced by the cache, scheduler, and domain services
#[derive(Debug, Error)]
pub enum CoreError {
    /// Remote call failed at the transport level with no usable cached
    /// copy. `key` names the cache key for reads and the operation for
    /// mutations. Not retried automatically; the caller decides.
    #[error("network unavailable and no cached copy for '{key}': {reason}")]
    NetworkUnavailable { key: String, reason: String },

    /// The remote endpoint answered with a structured error. These never
    /// fall back to cache: the server made a decision, stale data must not
    /// mask it.
    #[error("api error {code}: {message}")]
    Api { code: u16, message: String },

    /// Local alert scheduling is not permitted on this device
    #[error("permission to raise local alerts was denied")]
    PermissionDenied,

    /// Key-value store read/write failed
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl CoreError {
    /// True when the error means "server said no" rather than "server
    /// unreachable"; the distinction drives cache-fallback eligibility.
    pub fn is_api_rejection(&self) -> bool {
        matches!(self, CoreError::Api { .. })
    }

    /// Map a failed mutation call. Mutations have no cache to fall back
    /// to, so both failure kinds propagate unchanged in meaning.
    pub fn from_mutation(operation: &str, failure: crate::api::ApiFailure) -> Self {
        match failure {
            crate::api::ApiFailure::Transport(reason) => CoreError::NetworkUnavailable {
                key: operation.to_string(),
                reason,
            },
            crate::api::ApiFailure::Rejected(err) => CoreError::Api {
                code: err.code,
                message: err.message,
            },
        }
    }
}
