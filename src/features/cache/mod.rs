//! # Feature: Offline Cache
//!
//! Cache-aside layer shared by every domain service. Reads go through the
//! remote API when possible and fall back to the last successful fetch when
//! the network is down; writes happen only as read-through, invalidation is
//! explicit and driven by the mutation table.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: TTL support for search results, expired entries deleted on read
//! - 1.1.0: Added FetchSource so callers can observe degraded reads
//! - 1.0.0: Initial release

pub mod keys;
pub mod repository;

pub use repository::{CacheEntry, CacheRepository, Fetched, FetchSource};
