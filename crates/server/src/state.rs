//! Application state.

use crate::pages::SitePages;
use hoist_core::config::AppConfig;
use hoist_core::{RandomSlugs, SlugSource, StorageLayout};
use hoist_counters::CounterStore;
use hoist_storage::{ObjectStore, StorageError, StorageResult};
use std::future::Future;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Storage backend.
    pub storage: Arc<dyn ObjectStore>,
    /// Usage counters store.
    pub counters: Arc<dyn CounterStore>,
    /// Object key layout for deployment namespaces.
    pub layout: StorageLayout,
    /// Generator for new deployment slugs.
    pub slugs: Arc<dyn SlugSource>,
    /// Landing template and not-found page.
    pub pages: Arc<SitePages>,
    /// Normalized origin host (lowercase, no trailing dot).
    pub origin: Arc<str>,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        config: AppConfig,
        storage: Arc<dyn ObjectStore>,
        counters: Arc<dyn CounterStore>,
        pages: SitePages,
    ) -> Self {
        let layout = StorageLayout::new(&config.site.key_root);
        let origin: Arc<str> = config.server.origin_host().into();
        Self {
            config: Arc::new(config),
            storage,
            counters,
            layout,
            slugs: Arc::new(RandomSlugs),
            pages: Arc::new(pages),
            origin,
        }
    }

    /// Replace the slug generator.
    pub fn with_slug_source(mut self, slugs: Arc<dyn SlugSource>) -> Self {
        self.slugs = slugs;
        self
    }

    /// Run a storage call under the configured per-call timeout.
    pub async fn storage_call<T, F>(&self, call: F) -> StorageResult<T>
    where
        F: Future<Output = StorageResult<T>>,
    {
        let limit = self.config.server.storage_timeout();
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                format!("storage call exceeded {}s", limit.as_secs()),
            ))),
        }
    }
}
