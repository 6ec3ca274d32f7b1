//! # Storage Module
//!
//! The persistent key-value store every cache namespace and the reminder
//! manifest live in. The store itself is an external collaborator; this
//! module defines the contract and two concrete backends: sqlite for the
//! real process and an in-memory map for tests and diagnostics tooling.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Added remove_many and get_all_keys for bulk cache clearing
//! - 1.0.0: Initial release with sqlite and memory backends

pub mod memory;
pub mod sqlite_store;

pub use memory::MemoryStore;
pub use sqlite_store::SqliteStore;

use anyhow::Result;
use async_trait::async_trait;

/// Process-wide persistent map of string keys to string values.
///
/// All methods are suspension points; implementations must be safe to share
/// behind an `Arc` across tasks.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `None` for a missing key, never an error
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write or overwrite a value
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key; removing a missing key is a no-op
    async fn remove(&self, key: &str) -> Result<()>;

    /// Remove several keys in one call
    async fn remove_many(&self, keys: &[String]) -> Result<()>;

    /// All stored keys, used only for bulk cache-clear by prefix match
    async fn get_all_keys(&self) -> Result<Vec<String>>;
}
