//! Asset resolution: map a deployment request path onto a stored object.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::http::StatusCode;
use hoist_core::layout::{Candidate, CandidateKind};
use hoist_core::{DomainSlug, SafePath};
use hoist_storage::ObjectMeta;
use tracing::debug;

const HTML_CONTENT_TYPE: &str = "text/html";

/// A stored object chosen to answer a request.
#[derive(Debug, Clone)]
pub struct ResolvedAsset {
    /// Full object key.
    pub key: String,
    /// Which step of the candidate chain matched.
    pub kind: CandidateKind,
    /// Object metadata from the existence probe.
    pub meta: ObjectMeta,
    /// Content type to serve the object with.
    pub content_type: String,
}

impl ResolvedAsset {
    fn new(candidate: Candidate, meta: ObjectMeta) -> Self {
        let content_type = match candidate.kind {
            CandidateKind::Exact => mime_guess::from_path(&candidate.key)
                .first_or_octet_stream()
                .to_string(),
            CandidateKind::HtmlSuffix
            | CandidateKind::DirectoryIndex
            | CandidateKind::SpaFallback => HTML_CONTENT_TYPE.to_string(),
        };
        Self {
            key: candidate.key,
            kind: candidate.kind,
            meta,
            content_type,
        }
    }

    /// Status to answer with. The SPA fallback page is served as a miss.
    pub fn status(&self) -> StatusCode {
        match self.kind {
            CandidateKind::SpaFallback => StatusCode::NOT_FOUND,
            _ => StatusCode::OK,
        }
    }
}

/// Walk the candidate chain for `raw_path` inside the deployment namespace.
///
/// Returns `None` when nothing matches, including when the path cannot be
/// normalized. Probes run in order, one storage call each.
pub async fn resolve(
    state: &AppState,
    slug: &DomainSlug,
    raw_path: &str,
) -> ApiResult<Option<ResolvedAsset>> {
    let path = match SafePath::from_request_path(raw_path) {
        Ok(path) => path,
        Err(e) => {
            debug!(domain = %slug, path = raw_path, error = %e, "Rejected request path");
            return Ok(None);
        }
    };

    for candidate in state.layout.candidates(slug, &path) {
        match state.storage_call(state.storage.head(&candidate.key)).await {
            Ok(meta) => {
                debug!(
                    domain = %slug,
                    key = %candidate.key,
                    kind = candidate.kind.as_str(),
                    "Resolved asset"
                );
                return Ok(Some(ResolvedAsset::new(candidate, meta)));
            }
            Err(e) if e.is_not_found() => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(None)
}
