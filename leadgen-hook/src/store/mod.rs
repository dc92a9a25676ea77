//! Accumulator store for tagged webhook entries
//!
//! Handlers receive the store as an injected `Arc<dyn ResultStore>`, so the
//! backing memory can be swapped without touching the routes:
//! - [`MemoryStore`]: process-lifetime, lost on restart
//! - [`SqliteStore`]: ordered table with an auto-increment key, survives restarts
//!
//! Both append atomically per call. Between clears the entry count only
//! grows; there is no single-entry edit or delete.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadgen_common::{Entry, Result};

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Full store contents at one point in time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Entries in insertion order
    pub entries: Vec<Entry>,
    /// Time of the last successful write, `None` after a clear
    pub last_updated: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Append entries after the existing ones and stamp `last_updated`
    ///
    /// Returns the new total entry count.
    async fn append(&self, entries: Vec<Entry>) -> Result<usize>;

    /// Replace the whole sequence and stamp `last_updated`
    async fn replace_all(&self, entries: Vec<Entry>) -> Result<usize>;

    /// Current entries, unsorted and unfiltered
    async fn list(&self) -> Result<Snapshot>;

    /// Remove everything and reset `last_updated`; idempotent
    async fn clear(&self) -> Result<()>;

    /// Number of stored entries
    async fn count(&self) -> Result<usize> {
        Ok(self.list().await?.entries.len())
    }

    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;
}
