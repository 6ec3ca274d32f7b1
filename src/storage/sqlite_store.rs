//! Sqlite-backed key-value store.
//!
//! One table, one row per key. The connection is not thread-safe, so it
//! sits behind an async mutex; every call takes the lock for the duration
//! of the statement and nothing is held across other suspension points.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::debug;
use sqlite::{Connection, State};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::KeyValueStore;

/// Durable store backed by a single sqlite file
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database file and ensure the schema exists
    pub fn open(path: &str) -> Result<Self> {
        let conn = sqlite::open(path).map_err(|e| anyhow!("Failed to open {}: {}", path, e))?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .map_err(|e| anyhow!("Failed to create kv_store table: {}", e))?;

        debug!("Opened sqlite store at {path}");
        Ok(SqliteStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT value FROM kv_store WHERE key = ?")
            .map_err(|e| anyhow!("prepare failed: {}", e))?;
        stmt.bind((1, key)).map_err(|e| anyhow!("bind failed: {}", e))?;

        match stmt.next() {
            Ok(State::Row) => {
                let value = stmt
                    .read::<String, _>(0)
                    .map_err(|e| anyhow!("read failed: {}", e))?;
                Ok(Some(value))
            }
            Ok(State::Done) => Ok(None),
            Err(e) => Err(anyhow!("query failed: {}", e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare("INSERT INTO kv_store (key, value) VALUES (?, ?) ON CONFLICT(key) DO UPDATE SET value = excluded.value")
            .map_err(|e| anyhow!("prepare failed: {}", e))?;
        stmt.bind((1, key)).map_err(|e| anyhow!("bind failed: {}", e))?;
        stmt.bind((2, value))
            .map_err(|e| anyhow!("bind failed: {}", e))?;
        while let Ok(State::Row) = stmt.next() {}
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare("DELETE FROM kv_store WHERE key = ?")
            .map_err(|e| anyhow!("prepare failed: {}", e))?;
        stmt.bind((1, key)).map_err(|e| anyhow!("bind failed: {}", e))?;
        while let Ok(State::Row) = stmt.next() {}
        Ok(())
    }

    async fn remove_many(&self, keys: &[String]) -> Result<()> {
        let conn = self.conn.lock().await;
        for key in keys {
            let mut stmt = conn
                .prepare("DELETE FROM kv_store WHERE key = ?")
                .map_err(|e| anyhow!("prepare failed: {}", e))?;
            stmt.bind((1, key.as_str()))
                .map_err(|e| anyhow!("bind failed: {}", e))?;
            while let Ok(State::Row) = stmt.next() {}
        }
        Ok(())
    }

    async fn get_all_keys(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT key FROM kv_store")
            .map_err(|e| anyhow!("prepare failed: {}", e))?;

        let mut keys = Vec::new();
        while let Ok(State::Row) = stmt.next() {
            keys.push(
                stmt.read::<String, _>(0)
                    .map_err(|e| anyhow!("read failed: {}", e))?,
            );
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_in_memory_db() {
        // ":memory:" gives a throwaway database with the real backend
        let store = SqliteStore::open(":memory:").unwrap();

        store.set("medicines_u1", "[]").await.unwrap();
        assert_eq!(
            store.get("medicines_u1").await.unwrap(),
            Some("[]".to_string())
        );

        // overwrite
        store.set("medicines_u1", "[1]").await.unwrap();
        assert_eq!(
            store.get("medicines_u1").await.unwrap(),
            Some("[1]".to_string())
        );

        store.remove("medicines_u1").await.unwrap();
        assert_eq!(store.get("medicines_u1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_all_keys() {
        let store = SqliteStore::open(":memory:").unwrap();
        store.set("a", "1").await.unwrap();
        store.set("b", "2").await.unwrap();

        let mut keys = store.get_all_keys().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);

        store
            .remove_many(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert!(store.get_all_keys().await.unwrap().is_empty());
    }
}
