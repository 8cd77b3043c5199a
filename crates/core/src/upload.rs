//! Upload entries and the publish response.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// One file of an in-flight publish.
///
/// `size` is the declared payload size. When an upload exceeds the size
/// limit its payload is not retained, so `size` may be larger than
/// `data.len()`; such entries are always rejected before any write.
#[derive(Clone, Debug)]
pub struct UploadEntry {
    /// Client-supplied relative path.
    pub name: String,
    /// Payload size in bytes.
    pub size: u64,
    /// Payload bytes.
    pub data: Bytes,
}

impl UploadEntry {
    /// Create an entry holding its full payload.
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            name: name.into(),
            size: data.len() as u64,
            data,
        }
    }

    /// Create an entry whose payload was discarded for exceeding the limit.
    pub fn oversized(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            data: Bytes::new(),
        }
    }

    /// Check the entry against a per-file size limit.
    pub fn check_size(&self, limit: u64) -> crate::Result<()> {
        if self.size > limit {
            return Err(crate::Error::FileTooLarge {
                name: self.name.clone(),
                size: self.size,
                limit,
            });
        }
        Ok(())
    }
}

/// Successful publish result returned to the client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResponse {
    /// The deployment's domain slug.
    pub domain: String,
    /// Public URL of the deployment.
    pub url: String,
    /// Number of files written.
    pub total_files: usize,
}
