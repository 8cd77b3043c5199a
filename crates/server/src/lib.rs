//! HTTP server for Hoist.
//!
//! This crate provides the axum-based server:
//! - `POST /publish` multipart uploads into fresh deployment namespaces
//! - Host-dispatched asset serving with the index/`.html`/`200.html` fallback chain
//! - The landing page with live usage counters on the root origin
//! - `/health` and Prometheus `/metrics` on the root origin

pub mod accounting;
pub mod error;
pub mod handlers;
pub mod host;
pub mod metrics;
pub mod pages;
pub mod publish;
pub mod resolve;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use pages::SitePages;
pub use routes::create_router;
pub use state::AppState;
