//! Object key layout: `<root>/<slug>/<relative-path>`.
//!
//! This is the only layout the system writes or reads. The candidate chain
//! used to resolve a request path against a deployment namespace lives here
//! too, since it is pure key arithmetic.

use crate::{DomainSlug, SafePath};

/// Name of the per-deployment directory index file.
pub const INDEX_FILE: &str = "index.html";

/// Name of the per-deployment single-page-app fallback file.
pub const SPA_FALLBACK_FILE: &str = "200.html";

/// Which rule of the resolution chain produced a candidate key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CandidateKind {
    /// The path itself, or its `index.html` when written as a directory.
    Exact,
    /// Extensionless path with `.html` appended.
    HtmlSuffix,
    /// Extensionless path treated as a directory with an `index.html`.
    DirectoryIndex,
    /// The deployment-wide `200.html`, served with a 404 status.
    SpaFallback,
}

impl CandidateKind {
    /// Short label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::HtmlSuffix => "html_suffix",
            Self::DirectoryIndex => "directory_index",
            Self::SpaFallback => "spa_fallback",
        }
    }
}

/// One storage key to probe while resolving a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub key: String,
    pub kind: CandidateKind,
}

/// Maps deployments and their relative paths onto object keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageLayout {
    root: String,
}

impl StorageLayout {
    /// Create a layout rooted at `root`. Surrounding separators are ignored;
    /// an empty root places namespaces at the top of the store.
    pub fn new(root: impl AsRef<str>) -> Self {
        Self {
            root: root.as_ref().trim_matches('/').to_string(),
        }
    }

    /// The fixed key root.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Key prefix owning every object of a deployment, with trailing `/`.
    pub fn namespace(&self, slug: &DomainSlug) -> String {
        if self.root.is_empty() {
            format!("{slug}/")
        } else {
            format!("{}/{}/", self.root, slug)
        }
    }

    /// Object key of a relative path inside a deployment namespace.
    pub fn object_key(&self, slug: &DomainSlug, relative: &str) -> String {
        format!("{}{}", self.namespace(slug), relative)
    }

    /// Ordered storage keys to probe for a request path.
    ///
    /// 1. the path itself (or `<path>/index.html` for a directory)
    /// 2. `<path>.html` when the last segment has no extension
    /// 3. `<path>/index.html` under the same condition
    /// 4. the deployment's `200.html`
    pub fn candidates(&self, slug: &DomainSlug, path: &SafePath) -> Vec<Candidate> {
        let mut candidates = Vec::with_capacity(4);

        let exact = if path.is_directory() {
            path.join(INDEX_FILE)
        } else {
            path.as_str().to_string()
        };
        candidates.push(Candidate {
            key: self.object_key(slug, &exact),
            kind: CandidateKind::Exact,
        });

        if !path.is_directory() && !path.has_extension() {
            candidates.push(Candidate {
                key: self.object_key(slug, &format!("{}.html", path.as_str())),
                kind: CandidateKind::HtmlSuffix,
            });
            candidates.push(Candidate {
                key: self.object_key(slug, &path.join(INDEX_FILE)),
                kind: CandidateKind::DirectoryIndex,
            });
        }

        let fallback = self.object_key(slug, SPA_FALLBACK_FILE);
        if candidates.iter().all(|c| c.key != fallback) {
            candidates.push(Candidate {
                key: fallback,
                kind: CandidateKind::SpaFallback,
            });
        }

        candidates
    }
}

impl Default for StorageLayout {
    fn default() -> Self {
        Self::new(crate::DEFAULT_KEY_ROOT)
    }
}
