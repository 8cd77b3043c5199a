//! Health probe for the root origin.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub storage: &'static str,
    pub counters: &'static str,
}

/// GET /health - probe both stores.
pub async fn health_check(state: &AppState) -> ApiResult<Json<HealthResponse>> {
    state
        .storage_call(state.storage.health_check())
        .await
        .map_err(|e| ApiError::Unavailable(format!("storage: {e}")))?;

    let limit = state.config.server.storage_timeout();
    match tokio::time::timeout(limit, state.counters.health_check()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(ApiError::Unavailable(format!("counters: {e}"))),
        Err(_) => {
            return Err(ApiError::Unavailable(format!(
                "counters: timed out after {}s",
                limit.as_secs()
            )));
        }
    }

    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage.backend_name(),
        counters: state.counters.backend_name(),
    }))
}
