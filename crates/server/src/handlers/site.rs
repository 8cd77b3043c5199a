//! Host-dispatched serving: the landing page on the root origin, deployed
//! assets on deployment subdomains.

use crate::accounting::spawn_increments;
use crate::error::{ApiError, ApiResult};
use crate::handlers::health::health_check;
use crate::host::{self, Tenant};
use crate::metrics::{BYTES_SERVED, metrics_handler, record_asset_response};
use crate::resolve::{ResolvedAsset, resolve};
use crate::state::AppState;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri, header};
use axum::response::{Html, IntoResponse, Response};
use futures::StreamExt;
use hoist_core::{ASSET_CACHE_MAX_AGE_SECS, Counter, DomainSlug};
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// RFC 9110 IMF-fixdate.
const HTTP_DATE: &[BorrowedFormatItem<'static>] = format_description!(
    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

/// Fallback handler for every request that is not a publish.
pub async fn serve_site(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::ALLOW, "GET, HEAD")],
        )
            .into_response();
    }

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| uri.host())
        .unwrap_or_default();

    let result = match host::classify(host, &state.origin) {
        Tenant::Root => serve_root(&state, uri.path()).await,
        Tenant::Deployment(slug) => serve_asset(&state, &method, &slug, uri.path()).await,
        Tenant::Unknown => Ok(not_found_page(&state)),
    };
    result.into_response()
}

async fn serve_root(state: &AppState, path: &str) -> ApiResult<Response> {
    match path {
        "/" => landing(state).await,
        "/health" => Ok(health_check(state).await.into_response()),
        "/metrics" if state.config.server.metrics_enabled => {
            Ok(metrics_handler().await.into_response())
        }
        _ => Ok(not_found_page(state)),
    }
}

async fn landing(state: &AppState) -> ApiResult<Response> {
    let limit = state.config.server.storage_timeout();
    let snapshot = tokio::time::timeout(limit, state.counters.snapshot())
        .await
        .map_err(|_| {
            ApiError::Internal(format!(
                "counters read timed out after {}s",
                limit.as_secs()
            ))
        })??;

    Ok(Html(state.pages.render_landing(&snapshot)).into_response())
}

async fn serve_asset(
    state: &AppState,
    method: &Method,
    slug: &DomainSlug,
    path: &str,
) -> ApiResult<Response> {
    let Some(asset) = resolve(state, slug, path).await? else {
        record_asset_response("not_found");
        return Ok(not_found_page(state));
    };

    let headers = asset_headers(&asset);
    if method == Method::HEAD {
        return Ok((asset.status(), headers).into_response());
    }

    let stream = match state.storage_call(state.storage.get_stream(&asset.key)).await {
        Ok(stream) => stream,
        // Deleted between the probe and the read.
        Err(e) if e.is_not_found() => {
            record_asset_response("not_found");
            return Ok(not_found_page(state));
        }
        Err(e) => return Err(e.into()),
    };

    record_asset_response(asset.kind.as_str());
    BYTES_SERVED.inc_by(asset.meta.size);
    spawn_increments(
        state,
        &[(Counter::Requests, 1), (Counter::Bandwidth, asset.meta.size)],
    );

    let stream = stream.map(|r| r.map_err(|e| std::io::Error::other(e.to_string())));
    Ok((asset.status(), headers, Body::from_stream(stream)).into_response())
}

fn asset_headers(asset: &ResolvedAsset) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&asset.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(asset.meta.size));

    let max_age = ASSET_CACHE_MAX_AGE_SECS;
    if let Ok(value) = HeaderValue::from_str(&format!("public, max-age={max_age}")) {
        headers.insert(header::CACHE_CONTROL, value);
    }
    let expires = OffsetDateTime::now_utc() + time::Duration::seconds(max_age as i64);
    if let Some(value) = http_date(expires) {
        headers.insert(header::EXPIRES, value);
    }
    if let Some(value) = asset.meta.last_modified.and_then(http_date) {
        headers.insert(header::LAST_MODIFIED, value);
    }
    headers
}

fn not_found_page(state: &AppState) -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        state.pages.not_found(),
    )
        .into_response()
}

fn http_date(at: OffsetDateTime) -> Option<HeaderValue> {
    at.to_offset(time::UtcOffset::UTC)
        .format(HTTP_DATE)
        .ok()
        .and_then(|s| HeaderValue::from_str(&s).ok())
}
