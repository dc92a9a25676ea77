//! In-process result store
//!
//! Contents live as long as the process. Separate processes (or a restarted
//! one) each see their own, initially empty, store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadgen_common::{time, Entry, Result};
use tokio::sync::RwLock;

use super::{ResultStore, Snapshot};

#[derive(Debug, Default)]
struct Accumulator {
    entries: Vec<Entry>,
    last_updated: Option<DateTime<Utc>>,
}

/// Result store backed by process memory
///
/// Writers are serialised by the lock, so concurrent appends never lose
/// entries within one process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<Accumulator>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn append(&self, entries: Vec<Entry>) -> Result<usize> {
        let mut state = self.state.write().await;
        state.entries.extend(entries);
        state.last_updated = Some(time::now());
        Ok(state.entries.len())
    }

    async fn replace_all(&self, entries: Vec<Entry>) -> Result<usize> {
        let mut state = self.state.write().await;
        state.entries = entries;
        state.last_updated = Some(time::now());
        Ok(state.entries.len())
    }

    async fn list(&self) -> Result<Snapshot> {
        let state = self.state.read().await;
        Ok(Snapshot {
            entries: state.entries.clone(),
            last_updated: state.last_updated,
        })
    }

    async fn clear(&self) -> Result<()> {
        let mut state = self.state.write().await;
        state.entries.clear();
        state.last_updated = None;
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.state.read().await.entries.len())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadgen_common::tag_payload;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_new_store_is_empty() {
        let store = MemoryStore::new();
        let snapshot = store.list().await.unwrap();
        assert!(snapshot.entries.is_empty());
        assert!(snapshot.last_updated.is_none());
    }

    #[tokio::test]
    async fn test_append_preserves_arrival_order() {
        let store = MemoryStore::new();
        store.append(tag_payload(json!([{"name": "A"}, {"name": "B"}]))).await.unwrap();
        let total = store.append(tag_payload(json!({"name": "C"}))).await.unwrap();
        assert_eq!(total, 3);

        let snapshot = store.list().await.unwrap();
        let names: Vec<_> = snapshot.entries.iter().map(|e| e.get("name").unwrap().clone()).collect();
        assert_eq!(names, vec![json!("A"), json!("B"), json!("C")]);
        assert!(snapshot.last_updated.is_some());
    }

    #[tokio::test]
    async fn test_clear_resets_and_is_idempotent() {
        let store = MemoryStore::new();
        store.append(tag_payload(json!({"x": 1}))).await.unwrap();

        store.clear().await.unwrap();
        store.clear().await.unwrap();

        let snapshot = store.list().await.unwrap();
        assert!(snapshot.entries.is_empty());
        assert!(snapshot.last_updated.is_none());
    }

    #[tokio::test]
    async fn test_replace_all() {
        let store = MemoryStore::new();
        store.append(tag_payload(json!([{"n": 1}, {"n": 2}]))).await.unwrap();
        let total = store.replace_all(tag_payload(json!({"n": 3}))).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_not_lost() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for i in 0..50 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.append(tag_payload(json!({"i": i}))).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.count().await.unwrap(), 50);
    }
}
