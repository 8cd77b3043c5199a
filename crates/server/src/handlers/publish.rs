//! POST /publish - multipart upload of a static site.

use crate::error::{ApiError, ApiResult};
use crate::metrics::record_publish_error;
use crate::state::AppState;
use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode, header};
use bytes::BytesMut;
use hoist_core::{PublishResponse, UploadEntry};

/// Form field carrying the uploaded files.
pub const FILES_FIELD: &str = "files";

const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// POST /publish - publish the uploaded files as a new deployment.
///
/// Each `files` part is one file; its filename is the path relative to the
/// site root. Parts without a filename and parts under other names are
/// ignored.
pub async fn publish(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<PublishResponse>)> {
    let entries = read_upload(&headers, multipart, state.config.server.max_file_bytes)
        .await
        .inspect_err(|e| record_publish_error(e.code()))?;

    let response = crate::publish::publish(&state, entries).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn read_upload(
    headers: &HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
    max_file_bytes: u64,
) -> ApiResult<Vec<UploadEntry>> {
    if !is_multipart(headers) {
        return Err(ApiError::BadRequest(format!(
            "Content-Type must be {MULTIPART_FORM_DATA}"
        )));
    }
    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let mut entries = Vec::new();
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };

        // Oversized files are drained for their size but never buffered.
        let mut data = BytesMut::new();
        let mut size: u64 = 0;
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            size += chunk.len() as u64;
            if size <= max_file_bytes {
                data.extend_from_slice(&chunk);
            } else if !data.is_empty() {
                data = BytesMut::new();
            }
        }

        entries.push(if size > max_file_bytes {
            UploadEntry::oversized(name, size)
        } else {
            UploadEntry::new(name, data.freeze())
        });
    }

    Ok(entries)
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| {
            ct.trim_start()
                .to_ascii_lowercase()
                .starts_with(MULTIPART_FORM_DATA)
        })
        .unwrap_or(false)
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(e.body_text())
    } else {
        ApiError::BadRequest(e.body_text())
    }
}
