//! Storage trait definitions.

use crate::error::StorageResult;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use time::OffsetDateTime;

/// A boxed stream of bytes for streaming reads.
pub type ByteStream = Pin<Box<dyn Stream<Item = StorageResult<Bytes>> + Send>>;

/// Metadata about a stored object.
#[derive(Clone, Debug, Default)]
pub struct ObjectMeta {
    /// Object size in bytes.
    pub size: u64,
    /// Last modification time, when the backend reports one.
    pub last_modified: Option<OffsetDateTime>,
    /// Stored content type, when the backend records one. Informational
    /// only: responses derive their type from the key.
    pub content_type: Option<String>,
}

/// Key-addressed binary object storage.
///
/// Keys are `/`-separated relative paths. Backends must never read or write
/// outside the area they are configured for, whatever the key.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Get object metadata. Fails with `NotFound` for missing objects.
    async fn head(&self, key: &str) -> StorageResult<ObjectMeta>;

    /// Read a whole object into memory.
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Read an object as a finite, non-restartable byte stream.
    async fn get_stream(&self, key: &str) -> StorageResult<ByteStream>;

    /// Write an object, replacing any existing one.
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()>;

    /// Write an object and record its content type where the backend supports it.
    async fn put_with_content_type(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<()> {
        let _ = content_type;
        self.put(key, data).await
    }

    /// Delete an object. Fails with `NotFound` for missing objects.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// List every object key starting with `prefix`.
    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>>;

    /// Whether no object key starts with `prefix`.
    async fn is_prefix_empty(&self, prefix: &str) -> StorageResult<bool> {
        Ok(self.list(prefix).await?.is_empty())
    }

    /// Backend name for logs and metrics.
    fn backend_name(&self) -> &'static str;

    /// Verify the backend is reachable and writable enough to serve traffic.
    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}
