//! Publish pipeline: validate an upload set, claim a fresh deployment
//! namespace and write every file into it.

use crate::accounting::spawn_increments;
use crate::error::{ApiError, ApiResult};
use crate::metrics::{
    BYTES_PUBLISHED, FILES_PUBLISHED, PUBLISH_DURATION, PUBLISHES, SLUG_COLLISIONS,
    record_publish_error,
};
use crate::state::AppState;
use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use hoist_core::{Counter, DomainSlug, PublishResponse, SafePath, UploadEntry};
use std::collections::HashSet;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// A validated upload entry, ready to be written.
#[derive(Debug, Clone)]
struct PreparedFile {
    path: SafePath,
    data: Bytes,
    content_type: String,
}

/// Publish an upload set as a new deployment.
///
/// Every entry is validated before the first write, so a rejected set
/// leaves nothing behind. Writes that were issued before a storage
/// failure are not rolled back.
#[instrument(skip(state, entries), fields(files = entries.len()))]
pub async fn publish(state: &AppState, entries: Vec<UploadEntry>) -> ApiResult<PublishResponse> {
    let started = Instant::now();
    let result = run(state, entries).await;
    PUBLISH_DURATION.observe(started.elapsed().as_secs_f64());

    if let Err(e) = &result {
        record_publish_error(e.code());
    }
    result
}

async fn run(state: &AppState, entries: Vec<UploadEntry>) -> ApiResult<PublishResponse> {
    let files = prepare(entries, state.config.server.max_file_bytes)?;
    let slug = allocate_slug(state).await?;

    write_all(state, &slug, &files).await?;

    let total_bytes: u64 = files.iter().map(|f| f.data.len() as u64).sum();
    PUBLISHES.inc();
    FILES_PUBLISHED.inc_by(files.len() as u64);
    BYTES_PUBLISHED.inc_by(total_bytes);
    spawn_increments(
        state,
        &[(Counter::Bandwidth, total_bytes), (Counter::Deployments, 1)],
    );

    info!(
        domain = %slug,
        files = files.len(),
        bytes = total_bytes,
        "Published deployment"
    );

    Ok(PublishResponse {
        url: slug.url(&state.origin),
        domain: slug.to_string(),
        total_files: files.len(),
    })
}

/// Check sizes, normalize names and reject keys that collide, either as
/// duplicates or as a file that is also a parent directory of another.
fn prepare(
    entries: Vec<UploadEntry>,
    max_file_bytes: u64,
) -> hoist_core::Result<Vec<PreparedFile>> {
    if entries.is_empty() {
        return Err(hoist_core::Error::NoFilesProvided);
    }

    let mut seen = HashSet::with_capacity(entries.len());
    let mut files = Vec::with_capacity(entries.len());
    for entry in entries {
        entry.check_size(max_file_bytes)?;

        let path = SafePath::file_name(&entry.name)?;
        if !seen.insert(path.as_str().to_string()) {
            return Err(hoist_core::Error::InvalidPath(format!(
                "duplicate file path: {path}"
            )));
        }

        let content_type = mime_guess::from_path(path.as_str())
            .first_or_octet_stream()
            .to_string();
        files.push(PreparedFile {
            path,
            data: entry.data,
            content_type,
        });
    }

    for file in &files {
        let path = file.path.as_str();
        for (idx, _) in path.match_indices('/') {
            let dir = &path[..idx];
            if seen.contains(dir) {
                return Err(hoist_core::Error::InvalidPath(format!(
                    "{dir} is both a file and a directory"
                )));
            }
        }
    }
    Ok(files)
}

/// Draw slugs until one names an empty namespace.
async fn allocate_slug(state: &AppState) -> ApiResult<DomainSlug> {
    let attempts = state.config.server.slug_attempts.max(1);
    for attempt in 1..=attempts {
        let slug = state.slugs.next_slug();
        let namespace = state.layout.namespace(&slug);
        if state
            .storage_call(state.storage.is_prefix_empty(&namespace))
            .await?
        {
            return Ok(slug);
        }

        SLUG_COLLISIONS.inc();
        warn!(domain = %slug, attempt, "Generated domain already in use, retrying");
    }

    Err(ApiError::Internal(format!(
        "no free domain after {attempts} attempts"
    )))
}

async fn write_all(state: &AppState, slug: &DomainSlug, files: &[PreparedFile]) -> ApiResult<()> {
    let width = state.config.server.write_batch_width.max(1);

    futures::stream::iter(files)
        .map(Ok::<&PreparedFile, ApiError>)
        .try_for_each_concurrent(width, |file| async move {
            let key = state.layout.object_key(slug, file.path.as_str());
            let written = state
                .storage_call(state.storage.put_with_content_type(
                    &key,
                    file.data.clone(),
                    &file.content_type,
                ))
                .await;
            written.map_err(|source| ApiError::StorageWriteFailed { key, source })
        })
        .await
}
