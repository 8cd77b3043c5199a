//! Storage and counters test doubles.

use async_trait::async_trait;
use bytes::Bytes;
use hoist_core::{Counter, DomainSlug, SlugSource};
use hoist_counters::{CounterStore, CountersError, CountersResult};
use hoist_storage::{ByteStream, ObjectMeta, ObjectStore, StorageError, StorageResult};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Object store wrapper that counts calls and can be told to fail writes.
#[allow(dead_code)]
pub struct InstrumentedStore {
    inner: Arc<dyn ObjectStore>,
    puts: AtomicUsize,
    heads: Mutex<Vec<String>>,
    fail_puts: AtomicBool,
    fail_after: AtomicUsize,
    put_delay: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[allow(dead_code)]
impl InstrumentedStore {
    pub fn new(inner: Arc<dyn ObjectStore>) -> Self {
        Self {
            inner,
            puts: AtomicUsize::new(0),
            heads: Mutex::new(Vec::new()),
            fail_puts: AtomicBool::new(false),
            fail_after: AtomicUsize::new(usize::MAX),
            put_delay: Mutex::new(None),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Let the first `n` writes through and fail every later one.
    pub fn fail_after(&self, n: usize) {
        self.fail_after.store(n, Ordering::SeqCst);
    }

    /// Hold each write open for `delay` so concurrent writes overlap.
    pub fn slow_puts(&self, delay: Duration) {
        *self.put_delay.lock().unwrap() = Some(delay);
    }

    /// Highest number of writes observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Make every subsequent write fail.
    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    /// Number of writes attempted.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Keys probed with `head`, in order.
    pub fn head_keys(&self) -> Vec<String> {
        self.heads.lock().unwrap().clone()
    }

    pub fn clear_heads(&self) {
        self.heads.lock().unwrap().clear();
    }
}

#[async_trait]
impl ObjectStore for InstrumentedStore {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.inner.exists(key).await
    }

    async fn head(&self, key: &str) -> StorageResult<ObjectMeta> {
        self.heads.lock().unwrap().push(key.to_string());
        self.inner.head(key).await
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        self.inner.get(key).await
    }

    async fn get_stream(&self, key: &str) -> StorageResult<ByteStream> {
        self.inner.get_stream(key).await
    }

    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()> {
        let attempt = self.puts.fetch_add(1, Ordering::SeqCst) + 1;
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay = *self.put_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let result = if self.fail_puts.load(Ordering::SeqCst)
            || attempt > self.fail_after.load(Ordering::SeqCst)
        {
            Err(StorageError::Io(std::io::Error::other(
                "injected write failure",
            )))
        } else {
            self.inner.put(key, data).await
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.inner.delete(key).await
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        self.inner.list(prefix).await
    }

    fn backend_name(&self) -> &'static str {
        "instrumented"
    }

    async fn health_check(&self) -> StorageResult<()> {
        self.inner.health_check().await
    }
}

/// Counters store whose every call fails.
#[allow(dead_code)]
pub struct BrokenCounters;

#[async_trait]
impl CounterStore for BrokenCounters {
    async fn increment(&self, _counter: Counter, _delta: u64) -> CountersResult<()> {
        Err(CountersError::Internal("counters offline".to_string()))
    }

    async fn read_all(&self) -> CountersResult<HashMap<String, u64>> {
        Err(CountersError::Internal("counters offline".to_string()))
    }

    async fn health_check(&self) -> CountersResult<()> {
        Err(CountersError::Internal("counters offline".to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "broken"
    }
}

/// Slug source that replays a fixed sequence, then repeats the last slug.
#[allow(dead_code)]
pub struct ScriptedSlugs {
    queue: Mutex<VecDeque<DomainSlug>>,
    last: DomainSlug,
}

#[allow(dead_code)]
impl ScriptedSlugs {
    pub fn new(slugs: &[&str]) -> Self {
        let queue: VecDeque<DomainSlug> = slugs
            .iter()
            .map(|s| DomainSlug::parse(s).unwrap())
            .collect();
        let last = queue.back().cloned().unwrap();
        Self {
            queue: Mutex::new(queue),
            last,
        }
    }
}

impl SlugSource for ScriptedSlugs {
    fn next_slug(&self) -> DomainSlug {
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.last.clone())
    }
}
