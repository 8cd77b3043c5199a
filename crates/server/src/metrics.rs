//! Prometheus metrics for the Hoist server.
//!
//! Served from `/metrics` on the root origin host only. The values are
//! aggregate (no slugs or paths), but the endpoint should still be
//! restricted to scrapers at the network level.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::core::Collector;
use prometheus::{
    self, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use std::sync::{LazyLock, Once};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// Publish metrics
pub static PUBLISHES: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "hoist_publishes_total",
        "Total number of successful publishes",
    )
    .expect("metric creation failed")
});

pub static FILES_PUBLISHED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "hoist_files_published_total",
        "Total number of files written by publishes",
    )
    .expect("metric creation failed")
});

pub static BYTES_PUBLISHED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "hoist_bytes_published_total",
        "Total bytes written by publishes",
    )
    .expect("metric creation failed")
});

pub static PUBLISH_ERRORS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("hoist_publish_errors_total", "Total publish errors by error type"),
        &["error_type"],
    )
    .expect("metric creation failed")
});

pub static PUBLISH_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "hoist_publish_duration_seconds",
            "Time taken to validate and write a publish",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
    )
    .expect("metric creation failed")
});

pub static SLUG_COLLISIONS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "hoist_slug_collisions_total",
        "Generated domain slugs rejected because their namespace was taken",
    )
    .expect("metric creation failed")
});

// Serving metrics
pub static ASSET_RESPONSES: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "hoist_asset_responses_total",
            "Deployment asset responses by resolution outcome",
        ),
        &["outcome"],
    )
    .expect("metric creation failed")
});

pub static BYTES_SERVED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "hoist_bytes_served_total",
        "Total bytes of deployment assets served",
    )
    .expect("metric creation failed")
});

// Accounting metrics
pub static COUNTER_UPDATE_FAILURES: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "hoist_counter_update_failures_total",
            "Usage counter increments that failed and were dropped",
        ),
        &["counter"],
    )
    .expect("metric creation failed")
});

static REGISTER_ONCE: Once = Once::new();

/// Register all metrics with the global registry.
///
/// Idempotent, so tests may build any number of routers.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        let collectors: Vec<Box<dyn Collector>> = vec![
            Box::new(PUBLISHES.clone()),
            Box::new(FILES_PUBLISHED.clone()),
            Box::new(BYTES_PUBLISHED.clone()),
            Box::new(PUBLISH_ERRORS.clone()),
            Box::new(PUBLISH_DURATION.clone()),
            Box::new(SLUG_COLLISIONS.clone()),
            Box::new(ASSET_RESPONSES.clone()),
            Box::new(BYTES_SERVED.clone()),
            Box::new(COUNTER_UPDATE_FAILURES.clone()),
        ];
        for collector in collectors {
            REGISTRY
                .register(collector)
                .expect("metric registration failed");
        }
    });
}

/// GET /metrics - Prometheus metrics endpoint.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        ),
    }
}

/// Record a failed publish by error type.
pub fn record_publish_error(error_type: &str) {
    PUBLISH_ERRORS.with_label_values(&[error_type]).inc();
}

/// Record a served deployment asset by resolution outcome.
pub fn record_asset_response(outcome: &str) {
    ASSET_RESPONSES.with_label_values(&[outcome]).inc();
}
