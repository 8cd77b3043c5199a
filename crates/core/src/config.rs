//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Root origin hostname (e.g., "example.com"). Deployments are served
    /// from `<slug>.<origin>`; the origin itself serves the landing page.
    pub origin: String,
    /// Maximum size of a single uploaded file in bytes.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    /// Maximum size of a whole publish request body in bytes.
    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: u64,
    /// Number of concurrent object writes per publish.
    #[serde(default = "default_write_batch_width")]
    pub write_batch_width: usize,
    /// Whole-request timeout for publish uploads, in seconds.
    #[serde(default = "default_upload_timeout_secs")]
    pub upload_timeout_secs: u64,
    /// Timeout applied to each object/counters store call, in seconds.
    #[serde(default = "default_storage_timeout_secs")]
    pub storage_timeout_secs: u64,
    /// Attempts at drawing an unused slug before a publish fails.
    #[serde(default = "default_slug_attempts")]
    pub slug_attempts: u32,
    /// Enable the /metrics endpoint on the root origin (default: true).
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_max_file_bytes() -> u64 {
    crate::DEFAULT_MAX_FILE_BYTES
}

fn default_max_request_bytes() -> u64 {
    512 * 1024 * 1024
}

fn default_write_batch_width() -> usize {
    crate::DEFAULT_WRITE_BATCH_WIDTH
}

fn default_upload_timeout_secs() -> u64 {
    300 // 5 minutes
}

fn default_storage_timeout_secs() -> u64 {
    30
}

fn default_slug_attempts() -> u32 {
    5
}

fn default_metrics_enabled() -> bool {
    true
}

impl ServerConfig {
    /// Create a server configuration with defaults for the given origin.
    pub fn with_origin(origin: impl Into<String>) -> Self {
        Self {
            bind: default_bind(),
            origin: origin.into(),
            max_file_bytes: default_max_file_bytes(),
            max_request_bytes: default_max_request_bytes(),
            write_batch_width: default_write_batch_width(),
            upload_timeout_secs: default_upload_timeout_secs(),
            storage_timeout_secs: default_storage_timeout_secs(),
            slug_attempts: default_slug_attempts(),
            metrics_enabled: default_metrics_enabled(),
        }
    }

    /// The origin as matched against request hosts: lowercase, no trailing dot.
    pub fn origin_host(&self) -> String {
        self.origin.trim().trim_end_matches('.').to_ascii_lowercase()
    }

    /// Get the upload timeout as a Duration.
    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }

    /// Get the storage call timeout as a Duration.
    pub fn storage_timeout(&self) -> Duration {
        Duration::from_secs(self.storage_timeout_secs)
    }

    /// Validate server configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        let origin = self.origin_host();
        if origin.is_empty() {
            return Err("server.origin is required".to_string());
        }
        if origin.contains("://") || origin.contains('/') || origin.contains(':') {
            return Err(format!(
                "server.origin must be a bare hostname without scheme, port, or path, got {:?}",
                self.origin
            ));
        }
        if origin.chars().any(char::is_whitespace) {
            return Err("server.origin cannot contain whitespace".to_string());
        }
        if self.max_file_bytes == 0 {
            return Err("server.max_file_bytes must be greater than 0".to_string());
        }
        if self.max_request_bytes < self.max_file_bytes {
            return Err(format!(
                "server.max_request_bytes ({}) must be at least server.max_file_bytes ({})",
                self.max_request_bytes, self.max_file_bytes
            ));
        }
        if self.write_batch_width == 0 {
            return Err("server.write_batch_width must be greater than 0".to_string());
        }
        if self.upload_timeout_secs == 0 || self.storage_timeout_secs == 0 {
            return Err("server timeouts must be greater than 0".to_string());
        }
        if self.slug_attempts == 0 {
            return Err("server.slug_attempts must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Site presentation configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Object key root shared by every deployment namespace.
    #[serde(default = "default_key_root")]
    pub key_root: String,
    /// Landing page template served on the root origin. Uses the built-in
    /// page when unset. Supports `{{TOTAL_DEPLOYMENTS}}`, `{{TOTAL_REQUESTS}}`
    /// and `{{TOTAL_BANDWIDTH}}` placeholders.
    #[serde(default)]
    pub landing_template: Option<PathBuf>,
    /// Generic not-found page. Uses the built-in page when unset.
    #[serde(default)]
    pub not_found_page: Option<PathBuf>,
}

fn default_key_root() -> String {
    crate::DEFAULT_KEY_ROOT.to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            key_root: default_key_root(),
            landing_template: None,
            not_found_page: None,
        }
    }
}

/// Storage backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local filesystem storage.
    Filesystem {
        /// Root directory for storage.
        path: PathBuf,
    },
    /// S3-compatible storage.
    S3 {
        /// Bucket name.
        bucket: String,
        /// Optional endpoint URL (for MinIO, R2, etc.).
        endpoint: Option<String>,
        /// AWS region.
        region: Option<String>,
        /// Optional key prefix, prepended before the site key root.
        prefix: Option<String>,
        /// Access key ID. Falls back to the default AWS credential chain if not set.
        access_key_id: Option<String>,
        /// Secret access key. Prefer HOIST_STORAGE__SECRET_ACCESS_KEY over config files.
        secret_access_key: Option<String>,
        /// Force path-style URLs (`endpoint/bucket/key`). Required for MinIO.
        #[serde(default)]
        force_path_style: bool,
    },
}

impl StorageConfig {
    /// Validate storage configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            StorageConfig::Filesystem { path } if path.as_os_str().is_empty() => {
                Err("filesystem storage requires a non-empty path".to_string())
            }
            StorageConfig::S3 { bucket, .. } if bucket.is_empty() => {
                Err("s3 storage requires a bucket".to_string())
            }
            StorageConfig::S3 {
                access_key_id,
                secret_access_key,
                ..
            } => match (access_key_id.as_ref(), secret_access_key.as_ref()) {
                (Some(_), Some(_)) | (None, None) => Ok(()),
                _ => Err(
                    "s3 config requires both access_key_id and secret_access_key when either is set"
                        .to_string(),
                ),
            },
            _ => Ok(()),
        }
    }
}

/// Counters store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CountersConfig {
    /// SQLite database file.
    Sqlite {
        /// Database file path.
        path: PathBuf,
    },
    /// PostgreSQL database.
    Postgres {
        /// Connection URL. Prefer HOIST_COUNTERS__URL over storing credentials in config.
        url: String,
        /// Maximum connections in the pool.
        #[serde(default = "default_max_connections")]
        max_connections: u32,
        /// Statement timeout in milliseconds.
        #[serde(default = "default_statement_timeout_ms")]
        statement_timeout_ms: Option<u64>,
    },
    /// Process-local counters, lost on restart. For development and tests.
    Memory,
}

fn default_max_connections() -> u32 {
    10
}

fn default_statement_timeout_ms() -> Option<u64> {
    Some(5000)
}

impl CountersConfig {
    /// Validate counters configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            CountersConfig::Sqlite { path } if path.as_os_str().is_empty() => {
                Err("sqlite counters require a non-empty path".to_string())
            }
            CountersConfig::Postgres { url, .. } if url.is_empty() => {
                Err("postgres counters require a url".to_string())
            }
            CountersConfig::Postgres {
                max_connections: 0, ..
            } => Err("counters.max_connections must be greater than 0".to_string()),
            _ => Ok(()),
        }
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration (required for `server.origin`).
    pub server: ServerConfig,
    /// Site presentation configuration.
    #[serde(default)]
    pub site: SiteConfig,
    /// Object storage backend configuration (required).
    pub storage: StorageConfig,
    /// Counters store configuration (required).
    pub counters: CountersConfig,
}

impl AppConfig {
    /// Create a test configuration with sensible defaults.
    ///
    /// **For testing only.** Uses filesystem storage under `./data/storage`
    /// and in-memory counters.
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig::with_origin("hoist.test"),
            site: SiteConfig::default(),
            storage: StorageConfig::Filesystem {
                path: PathBuf::from("./data/storage"),
            },
            counters: CountersConfig::Memory,
        }
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), String> {
        self.server.validate()?;
        self.storage.validate()?;
        self.counters.validate()?;
        Ok(())
    }
}
