//! In-process key-value store
//!
//! Clones share the same map, so a handle can be kept for inspection while
//! another is owned by the ledger.

use crate::domain::repository::KeyValueStore;
use crate::error::LedgerResult;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default)]
pub struct InMemoryKvStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryKvStore {
    async fn get(&self, key: &str) -> LedgerResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> LedgerResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
    ) -> LedgerResult<bool> {
        let mut entries = self.entries.write().await;
        if entries.get(key).map(String::as_str) != expected {
            return Ok(false);
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing_key() {
        let store = InMemoryKvStore::new();
        assert_eq!(store.get("chain").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = InMemoryKvStore::new();
        store.set("chain", "a").await.unwrap();
        store.set("chain", "b").await.unwrap();
        assert_eq!(store.get("chain").await.unwrap().as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_compare_and_set_create() {
        let store = InMemoryKvStore::new();
        assert!(store.compare_and_set("chain", None, "a").await.unwrap());
        assert!(!store.compare_and_set("chain", None, "b").await.unwrap());
        assert_eq!(store.get("chain").await.unwrap().as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_compare_and_set_update() {
        let store = InMemoryKvStore::new();
        store.set("chain", "a").await.unwrap();

        assert!(!store.compare_and_set("chain", Some("stale"), "x").await.unwrap());
        assert!(store.compare_and_set("chain", Some("a"), "b").await.unwrap());
        assert_eq!(store.get("chain").await.unwrap().as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = InMemoryKvStore::new();
        let handle = store.clone();
        store.set("chain", "a").await.unwrap();
        assert_eq!(handle.get("chain").await.unwrap().as_deref(), Some("a"));
    }
}
