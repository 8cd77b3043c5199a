//! Usage counters store abstraction and implementations for Hoist.
//!
//! The counters store holds the three global usage counters (`bandwidth`,
//! `deployments`, `requests`). Increments are atomic against concurrent
//! writers; the atomicity is delegated to the backing store:
//! - SQLite and PostgreSQL via a single `INSERT ... ON CONFLICT DO UPDATE`
//! - An in-process map for development and tests

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{CountersError, CountersResult};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use store::{CounterStore, SqliteStore};

use hoist_core::config::CountersConfig;
use std::sync::Arc;

/// Create a counters store from configuration.
pub async fn from_config(config: &CountersConfig) -> CountersResult<Arc<dyn CounterStore>> {
    config.validate().map_err(CountersError::Config)?;

    match config {
        CountersConfig::Sqlite { path } => {
            let store = SqliteStore::new(path).await?;
            Ok(Arc::new(store) as Arc<dyn CounterStore>)
        }
        CountersConfig::Postgres {
            url,
            max_connections,
            statement_timeout_ms,
        } => {
            tracing::info!("Connecting to PostgreSQL counters store");
            let store =
                PostgresStore::from_url(url, *max_connections, *statement_timeout_ms).await?;
            Ok(Arc::new(store) as Arc<dyn CounterStore>)
        }
        CountersConfig::Memory => {
            tracing::warn!("Using in-memory counters; values are lost on restart");
            Ok(Arc::new(MemoryStore::new()) as Arc<dyn CounterStore>)
        }
    }
}

/// Convert a stored signed value to a counter value.
pub(crate) fn stored_to_u64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// Convert a counter delta to the signed column type.
pub(crate) fn delta_to_stored(
    counter: hoist_core::Counter,
    delta: u64,
) -> CountersResult<i64> {
    i64::try_from(delta).map_err(|_| CountersError::Overflow {
        counter: counter.as_str(),
        delta,
    })
}
