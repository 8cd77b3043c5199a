//! Counters store trait and the SQLite implementation.

use crate::error::CountersResult;
use async_trait::async_trait;
use hoist_core::{Counter, CounterSnapshot};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Named, monotonically increasing counters with atomic increments.
#[async_trait]
pub trait CounterStore: Send + Sync + 'static {
    /// Atomically add `delta` to a counter, creating it at zero if absent.
    async fn increment(&self, counter: Counter, delta: u64) -> CountersResult<()>;

    /// Read every stored counter as `name → value`.
    async fn read_all(&self) -> CountersResult<HashMap<String, u64>>;

    /// Read the known counters, treating missing ones as zero.
    async fn snapshot(&self) -> CountersResult<CounterSnapshot> {
        Ok(CounterSnapshot::from_map(&self.read_all().await?))
    }

    /// Check store connectivity.
    async fn health_check(&self) -> CountersResult<()>;

    /// Backend name for logs and metrics.
    fn backend_name(&self) -> &'static str;
}

const SQLITE_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS counters (
    name TEXT PRIMARY KEY NOT NULL,
    value INTEGER NOT NULL DEFAULT 0
)";

const SQLITE_INCREMENT: &str = "INSERT INTO counters (name, value) VALUES (?1, ?2)
    ON CONFLICT(name) DO UPDATE SET value = counters.value + excluded.value";

/// SQLite-based counters store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (creating if needed) a SQLite counters database.
    pub async fn new(path: impl AsRef<Path>) -> CountersResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5));

        // A single connection serializes writers and avoids "database is locked".
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Create the counters table if it does not exist.
    pub async fn migrate(&self) -> CountersResult<()> {
        sqlx::query(SQLITE_SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl CounterStore for SqliteStore {
    async fn increment(&self, counter: Counter, delta: u64) -> CountersResult<()> {
        let delta = crate::delta_to_stored(counter, delta)?;
        sqlx::query(SQLITE_INCREMENT)
            .bind(counter.as_str())
            .bind(delta)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn read_all(&self) -> CountersResult<HashMap<String, u64>> {
        let rows: Vec<(String, i64)> = sqlx::query_as("SELECT name, value FROM counters")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(name, value)| (name, crate::stored_to_u64(value)))
            .collect())
    }

    async fn health_check(&self) -> CountersResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
