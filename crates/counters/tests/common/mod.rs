//! Counters store test utilities.

use hoist_counters::{CounterStore, CountersError, CountersResult, PostgresStore, SqliteStore};
use std::sync::Arc;
use tempfile::TempDir;
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;

/// Stable prefix for Docker/container startup failures in Postgres test setup.
/// Tests use this marker to decide whether to skip due to unavailable Docker.
pub const POSTGRES_CONTAINER_START_ERR_PREFIX: &str = "postgres-container-start:";

/// A SQLite counters store in a temporary directory.
pub struct TestSqlite {
    pub store: Arc<SqliteStore>,
    _temp_dir: TempDir,
}

impl TestSqlite {
    pub async fn new() -> CountersResult<Self> {
        let temp_dir = tempfile::tempdir()?;
        let store = SqliteStore::new(temp_dir.path().join("counters.db")).await?;
        Ok(Self {
            store: Arc::new(store),
            _temp_dir: temp_dir,
        })
    }
}

/// A PostgreSQL counters store backed by a testcontainer.
pub struct TestPostgres {
    pub store: Arc<PostgresStore>,
    _container: ContainerAsync<Postgres>,
}

impl TestPostgres {
    pub async fn new() -> CountersResult<Self> {
        let container = Postgres::default()
            .with_tag("15-alpine")
            .start()
            .await
            .map_err(|e| {
                CountersError::Internal(format!(
                    "{POSTGRES_CONTAINER_START_ERR_PREFIX} Failed to start PostgreSQL container: {e}"
                ))
            })?;

        let host = container
            .get_host()
            .await
            .map_err(|e| CountersError::Internal(e.to_string()))?;
        let port = container
            .get_host_port_ipv4(5432)
            .await
            .map_err(|e| CountersError::Internal(e.to_string()))?;

        let url = format!("postgres://postgres:postgres@{host}:{port}/postgres");
        let store = PostgresStore::from_url(&url, 5, Some(5000)).await?;

        Ok(Self {
            store: Arc::new(store),
            _container: container,
        })
    }
}

/// Try to start PostgreSQL, skipping if Docker is unavailable or
/// SKIP_POSTGRES_TESTS is set. Other setup failures still panic.
pub async fn postgres_or_skip() -> Option<TestPostgres> {
    if std::env::var("SKIP_POSTGRES_TESTS").is_ok() {
        return None;
    }
    match TestPostgres::new().await {
        Ok(postgres) => Some(postgres),
        Err(err) => {
            let msg = err.to_string();
            if msg.contains(POSTGRES_CONTAINER_START_ERR_PREFIX) {
                eprintln!("Skipping PostgreSQL test (Docker unavailable): {msg}");
                None
            } else {
                panic!("PostgreSQL test setup failed: {msg}");
            }
        }
    }
}

/// Run a test body against SQLite and, when available, PostgreSQL.
pub async fn run_counters_test_both<F, Fut>(test_fn: F)
where
    F: Fn(Arc<dyn CounterStore>) -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    let sqlite = TestSqlite::new()
        .await
        .expect("Failed to create SQLite counters store");
    let store: Arc<dyn CounterStore> = sqlite.store.clone();
    test_fn(store).await;

    if let Some(postgres) = postgres_or_skip().await {
        let store: Arc<dyn CounterStore> = postgres.store.clone();
        test_fn(store).await;
    }
}
