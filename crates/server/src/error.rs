//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Message returned to clients for every 5xx response.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("failed to write {key}: {source}")]
    StorageWriteFailed {
        key: String,
        #[source]
        source: hoist_storage::StorageError,
    },

    #[error("storage error: {0}")]
    Storage(#[from] hoist_storage::StorageError),

    #[error("counters error: {0}")]
    Counters(#[from] hoist_counters::CountersError),

    #[error(transparent)]
    Core(#[from] hoist_core::Error),
}

impl ApiError {
    /// Get the error code for this error, used as a metrics label.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::Unavailable(_) => "unavailable",
            Self::Internal(_) => "internal_error",
            Self::StorageWriteFailed { .. } => "storage_write_failed",
            Self::Storage(_) => "storage_error",
            Self::Counters(_) => "counters_error",
            Self::Core(e) => match e {
                hoist_core::Error::InvalidPath(_) => "invalid_path",
                hoist_core::Error::InvalidDomain(_) => "invalid_domain",
                hoist_core::Error::NoFilesProvided => "no_files",
                hoist_core::Error::FileTooLarge { .. } => "file_too_large",
                hoist_core::Error::Config(_) => "config_error",
            },
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_)
            | Self::StorageWriteFailed { .. }
            | Self::Storage(_)
            | Self::Counters(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Core(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Server faults keep their detail in the logs only.
        let message = if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "Request failed");
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
