//! Landing page template and the tenant-independent not-found page.

use bytes::Bytes;
use hoist_core::CounterSnapshot;
use hoist_core::config::SiteConfig;
use hoist_core::format::{format_bytes, format_compact};
use std::path::Path;

const BUILTIN_LANDING: &str = include_str!("../assets/landing.html");
const BUILTIN_NOT_FOUND: &str = include_str!("../assets/not_found.html");

pub const DEPLOYMENTS_PLACEHOLDER: &str = "{{TOTAL_DEPLOYMENTS}}";
pub const REQUESTS_PLACEHOLDER: &str = "{{TOTAL_REQUESTS}}";
pub const BANDWIDTH_PLACEHOLDER: &str = "{{TOTAL_BANDWIDTH}}";

/// Static pages served by the root origin and on misses.
#[derive(Debug, Clone)]
pub struct SitePages {
    landing_template: String,
    not_found: Bytes,
}

impl SitePages {
    /// The pages compiled into the binary.
    pub fn builtin() -> Self {
        Self::new(BUILTIN_LANDING, BUILTIN_NOT_FOUND)
    }

    /// Build pages from explicit contents.
    pub fn new(landing_template: impl Into<String>, not_found: impl Into<Bytes>) -> Self {
        Self {
            landing_template: landing_template.into(),
            not_found: not_found.into(),
        }
    }

    /// Load pages, reading overrides named in the site config.
    pub async fn load(config: &SiteConfig) -> std::io::Result<Self> {
        let landing = match &config.landing_template {
            Some(path) => read_page(path).await?,
            None => BUILTIN_LANDING.to_string(),
        };
        let not_found = match &config.not_found_page {
            Some(path) => read_page(path).await?,
            None => BUILTIN_NOT_FOUND.to_string(),
        };
        Ok(Self::new(landing, not_found))
    }

    /// Render the landing template with the current counter values.
    pub fn render_landing(&self, snapshot: &CounterSnapshot) -> String {
        self.landing_template
            .replace(DEPLOYMENTS_PLACEHOLDER, &format_compact(snapshot.deployments))
            .replace(REQUESTS_PLACEHOLDER, &format_compact(snapshot.requests))
            .replace(BANDWIDTH_PLACEHOLDER, &format_bytes(snapshot.bandwidth))
    }

    /// Body of the not-found page.
    pub fn not_found(&self) -> Bytes {
        self.not_found.clone()
    }
}

impl Default for SitePages {
    fn default() -> Self {
        Self::builtin()
    }
}

async fn read_page(path: &Path) -> std::io::Result<String> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("failed to read page {}: {e}", path.display()),
        )
    })
}
