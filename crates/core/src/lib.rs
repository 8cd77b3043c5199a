//! Core domain types and shared logic for the Hoist static site host.
//!
//! This crate defines the data model used across all other crates:
//! - Request/upload path normalization that never escapes a deployment namespace
//! - Deployment domain slugs and their generator
//! - Object storage layout (`<root>/<slug>/<path>`)
//! - Upload entries and the publish response
//! - Usage counter names and human-readable formatting
//! - Configuration shared by the server and its backends

pub mod config;
pub mod counter;
pub mod domain;
pub mod error;
pub mod format;
pub mod layout;
pub mod path;
pub mod upload;

pub use counter::{Counter, CounterSnapshot};
pub use domain::{DomainSlug, RandomSlugs, SlugSource};
pub use error::{Error, Result};
pub use layout::StorageLayout;
pub use path::SafePath;
pub use upload::{PublishResponse, UploadEntry};

/// Default per-file upload limit: 10 MiB
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Default number of concurrent object writes per publish.
pub const DEFAULT_WRITE_BATCH_WIDTH: usize = 25;

/// Default object key root shared by every deployment namespace.
pub const DEFAULT_KEY_ROOT: &str = "yeet";

/// Cache lifetime applied to every served asset: one year.
pub const ASSET_CACHE_MAX_AGE_SECS: u64 = 31_536_000;
