//! PostgreSQL-based counters store.

use crate::error::CountersResult;
use crate::store::CounterStore;
use async_trait::async_trait;
use hoist_core::Counter;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Pool, Postgres};
use std::collections::HashMap;
use std::str::FromStr;

const POSTGRES_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS counters (
    name TEXT PRIMARY KEY,
    value BIGINT NOT NULL DEFAULT 0
)";

const POSTGRES_INCREMENT: &str = "INSERT INTO counters (name, value) VALUES ($1, $2)
    ON CONFLICT (name) DO UPDATE SET value = counters.value + EXCLUDED.value";

/// PostgreSQL-based counters store.
pub struct PostgresStore {
    pool: Pool<Postgres>,
}

impl PostgresStore {
    /// Connect using a connection URL and create the schema.
    pub async fn from_url(
        url: &str,
        max_connections: u32,
        statement_timeout_ms: Option<u64>,
    ) -> CountersResult<Self> {
        let mut opts = PgConnectOptions::from_str(url)?;

        if let Some(timeout_ms) = statement_timeout_ms {
            opts = opts.options([("statement_timeout", format!("{timeout_ms}ms"))]);
            tracing::info!("PostgreSQL statement_timeout set to {}ms", timeout_ms);
        }

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Create the counters table if it does not exist.
    pub async fn migrate(&self) -> CountersResult<()> {
        sqlx::query(POSTGRES_SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

#[async_trait]
impl CounterStore for PostgresStore {
    async fn increment(&self, counter: Counter, delta: u64) -> CountersResult<()> {
        let delta = crate::delta_to_stored(counter, delta)?;
        sqlx::query(POSTGRES_INCREMENT)
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
        "postgres"
    }
}
