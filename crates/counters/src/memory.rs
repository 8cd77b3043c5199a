//! In-process counters store.

use crate::error::CountersResult;
use crate::store::CounterStore;
use async_trait::async_trait;
use dashmap::DashMap;
use hoist_core::Counter;
use std::collections::HashMap;

/// Counters kept in process memory. Values are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: DashMap<Counter, u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn increment(&self, counter: Counter, delta: u64) -> CountersResult<()> {
        let mut value = self.values.entry(counter).or_insert(0);
        *value = value.saturating_add(delta);
        Ok(())
    }

    async fn read_all(&self) -> CountersResult<HashMap<String, u64>> {
        Ok(self
            .values
            .iter()
            .map(|entry| (entry.key().as_str().to_string(), *entry.value()))
            .collect())
    }

    async fn health_check(&self) -> CountersResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
