//! Server test utilities.

use crate::common::fixtures::{files_body, multipart_content_type};
use crate::common::storage::InstrumentedStore;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use bytes::Bytes;
use hoist_core::config::{AppConfig, CountersConfig, ServerConfig, StorageConfig};
use hoist_core::{Counter, DomainSlug};
use hoist_counters::{CounterStore, MemoryStore};
use hoist_server::{AppState, SitePages, create_router};
use hoist_storage::{FilesystemBackend, ObjectStore};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

/// Origin host used by every test server.
pub const ORIGIN: &str = "hoist.test";

/// A decoded HTTP response.
#[allow(dead_code)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[allow(dead_code)]
impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    pub store: Arc<InstrumentedStore>,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server with temporary storage and in-memory counters.
    pub async fn new() -> Self {
        Self::build(|_| {}, Arc::new(MemoryStore::new()), |state| state).await
    }

    /// Create a test server with adjusted server configuration.
    pub async fn with_config(adjust: impl FnOnce(&mut ServerConfig)) -> Self {
        Self::build(adjust, Arc::new(MemoryStore::new()), |state| state).await
    }

    /// Create a test server with a custom counters store.
    pub async fn with_counters(counters: Arc<dyn CounterStore>) -> Self {
        Self::build(|_| {}, counters, |state| state).await
    }

    /// Create a test server with a final adjustment of the state.
    pub async fn with_state(customize: impl FnOnce(AppState) -> AppState) -> Self {
        Self::build(|_| {}, Arc::new(MemoryStore::new()), customize).await
    }

    /// Create a test server with adjusted configuration and state.
    pub async fn with_config_and_state(
        adjust: impl FnOnce(&mut ServerConfig),
        customize: impl FnOnce(AppState) -> AppState,
    ) -> Self {
        Self::build(adjust, Arc::new(MemoryStore::new()), customize).await
    }

    async fn build(
        adjust: impl FnOnce(&mut ServerConfig),
        counters: Arc<dyn CounterStore>,
        customize: impl FnOnce(AppState) -> AppState,
    ) -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

        let storage_path = temp_dir.path().join("storage");
        std::fs::create_dir_all(&storage_path).expect("Failed to create storage directory");
        let backend: Arc<dyn ObjectStore> = Arc::new(
            FilesystemBackend::new(&storage_path)
                .await
                .expect("Failed to create storage backend"),
        );
        let store = Arc::new(InstrumentedStore::new(backend));

        let mut server = ServerConfig::with_origin(ORIGIN);
        adjust(&mut server);
        let config = AppConfig {
            server,
            site: Default::default(),
            storage: StorageConfig::Filesystem { path: storage_path },
            counters: CountersConfig::Memory,
        };

        hoist_server::metrics::register_metrics();
        let storage: Arc<dyn ObjectStore> = store.clone();
        let state = customize(AppState::new(
            config,
            storage,
            counters,
            SitePages::builtin(),
        ));
        let router = create_router(state.clone());

        Self {
            router,
            state,
            store,
            _temp_dir: temp_dir,
        }
    }

    /// Send a request and collect the whole response.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// GET `path` with the given `Host`.
    pub async fn get(&self, host: &str, path: &str) -> TestResponse {
        self.request("GET", host, path).await
    }

    /// Send a bodyless request with the given method and `Host`.
    pub async fn request(&self, method: &str, host: &str, path: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header("host", host)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// GET `path` on a deployment subdomain.
    pub async fn get_site(&self, slug: &str, path: &str) -> TestResponse {
        self.get(&site_host(slug), path).await
    }

    /// POST a raw body to /publish on the root origin.
    pub async fn publish_raw(&self, content_type: &str, body: Vec<u8>) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri("/publish")
            .header("host", ORIGIN)
            .header("content-type", content_type)
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Publish the given files and return the response.
    pub async fn publish(&self, files: &[(&str, &[u8])]) -> TestResponse {
        self.publish_raw(&multipart_content_type(), files_body(files))
            .await
    }

    /// Write an object straight into a deployment namespace.
    pub async fn seed(&self, slug: &str, path: &str, data: &[u8]) {
        let slug = DomainSlug::parse(slug).unwrap();
        let key = self.state.layout.object_key(&slug, path);
        self.state
            .storage
            .put(&key, Bytes::copy_from_slice(data))
            .await
            .unwrap();
    }

    /// Keys stored under a deployment namespace.
    pub async fn keys(&self, slug: &str) -> Vec<String> {
        let slug = DomainSlug::parse(slug).unwrap();
        let namespace = self.state.layout.namespace(&slug);
        self.state.storage.list(&namespace).await.unwrap()
    }

    /// Every key in the store.
    pub async fn all_keys(&self) -> Vec<String> {
        self.state.storage.list("").await.unwrap()
    }

    /// Wait until a usage counter reaches `expected`.
    pub async fn wait_for_counter(&self, counter: Counter, expected: u64) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        loop {
            let snapshot = self.state.counters.snapshot().await.unwrap();
            if snapshot.get(counter) == expected {
                return;
            }
            if tokio::time::Instant::now() > deadline {
                panic!(
                    "counter {counter} stuck at {} (expected {expected})",
                    snapshot.get(counter)
                );
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

/// `Host` value for a deployment slug.
#[allow(dead_code)]
pub fn site_host(slug: &str) -> String {
    format!("{slug}.{ORIGIN}")
}
