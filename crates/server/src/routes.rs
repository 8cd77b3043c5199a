//! Route definitions.

use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Create the application router.
///
/// Only `/publish` is routed by path. Everything else, including GET
/// requests to `/publish` on a deployment host, is dispatched by `Host`
/// in the site fallback.
pub fn create_router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.config.server.max_request_bytes).unwrap_or(usize::MAX);

    let publish_routes = Router::new()
        .route(
            "/publish",
            post(handlers::publish).fallback(handlers::serve_site),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::new(state.config.server.upload_timeout()));

    Router::new()
        .merge(publish_routes)
        .fallback(handlers::serve_site)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
