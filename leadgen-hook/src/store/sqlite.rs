//! SQLite-backed result store
//!
//! Entries live in an ordered table keyed by an auto-increment sequence, so
//! insertion order is the primary key order. `last_updated` lives in a
//! single-row state table. Every write runs in one transaction.

use async_trait::async_trait;
use leadgen_common::{time, Entry, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::path::Path;
use tracing::info;

use super::{ResultStore, Snapshot};

/// Result store backed by a SQLite database
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database file and ensure the schema exists
    pub async fn open(db_path: &Path) -> Result<Self> {
        let newly_created = !db_path.exists();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await?;

        if newly_created {
            info!("Initialized new result database: {}", db_path.display());
        } else {
            info!("Opened existing result database: {}", db_path.display());
        }

        // WAL lets list requests read while a callback is being written
        sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
        sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

        Self::from_pool(pool).await
    }

    /// Private in-memory database (one connection that never expires)
    pub async fn open_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self> {
        create_entries_table(&pool).await?;
        create_state_table(&pool).await?;
        Ok(Self { pool })
    }
}

async fn create_entries_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS webhook_entries (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            entry_id TEXT NOT NULL UNIQUE,
            received_at TEXT NOT NULL,
            record TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_state_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS webhook_state (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            last_updated TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("INSERT OR IGNORE INTO webhook_state (id, last_updated) VALUES (1, NULL)")
        .execute(pool)
        .await?;
    Ok(())
}

async fn insert_entries(tx: &mut Transaction<'_, Sqlite>, entries: &[Entry]) -> Result<()> {
    for entry in entries {
        let record = serde_json::to_string(entry)?;
        sqlx::query("INSERT INTO webhook_entries (entry_id, received_at, record) VALUES (?, ?, ?)")
            .bind(entry.entry_id())
            .bind(time::to_iso(&entry.received_at()))
            .bind(record)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

async fn touch_and_count(tx: &mut Transaction<'_, Sqlite>) -> Result<usize> {
    sqlx::query("UPDATE webhook_state SET last_updated = ? WHERE id = 1")
        .bind(time::to_iso(&time::now()))
        .execute(&mut **tx)
        .await?;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM webhook_entries")
        .fetch_one(&mut **tx)
        .await?;
    Ok(count as usize)
}

#[async_trait]
impl ResultStore for SqliteStore {
    async fn append(&self, entries: Vec<Entry>) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        insert_entries(&mut tx, &entries).await?;
        let total = touch_and_count(&mut tx).await?;
        tx.commit().await?;
        Ok(total)
    }

    async fn replace_all(&self, entries: Vec<Entry>) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM webhook_entries")
            .execute(&mut *tx)
            .await?;
        insert_entries(&mut tx, &entries).await?;
        let total = touch_and_count(&mut tx).await?;
        tx.commit().await?;
        Ok(total)
    }

    async fn list(&self) -> Result<Snapshot> {
        let mut tx = self.pool.begin().await?;

        let records: Vec<String> =
            sqlx::query_scalar("SELECT record FROM webhook_entries ORDER BY seq")
                .fetch_all(&mut *tx)
                .await?;

        let last_updated: Option<String> =
            sqlx::query_scalar("SELECT last_updated FROM webhook_state WHERE id = 1")
                .fetch_optional(&mut *tx)
                .await?
                .flatten();

        tx.commit().await?;

        let entries = records
            .iter()
            .map(|record| serde_json::from_str::<Entry>(record))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Snapshot {
            entries,
            last_updated: last_updated.as_deref().and_then(time::parse_iso),
        })
    }

    async fn clear(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM webhook_entries")
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE webhook_state SET last_updated = NULL WHERE id = 1")
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM webhook_entries")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}
