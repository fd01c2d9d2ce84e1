//! Prometheus metrics for the backroom server.
//!
//! Exposes counters for image uploads, duplicate suppression, and
//! best-effort cleanup outcomes.
//!
//! The `/metrics` endpoint is unauthenticated to allow Prometheus
//! scraping; restrict it to scraper IPs at the infrastructure level.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};
use std::sync::{LazyLock, Once};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

pub static IMAGES_UPLOADED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "backroom_images_uploaded_total",
        "Total number of images uploaded to the asset store",
    )
    .expect("metric creation failed")
});

pub static UPLOADS_DEDUPLICATED_CACHE: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "backroom_uploads_deduplicated_cache_total",
        "Uploads answered from the duplicate-upload cache",
    )
    .expect("metric creation failed")
});

pub static UPLOADS_DEDUPLICATED_STORE: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "backroom_uploads_deduplicated_store_total",
        "Uploads answered by the store existence check",
    )
    .expect("metric creation failed")
});

pub static UPLOAD_ERRORS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "backroom_upload_errors_total",
        "Failed asset store uploads",
    )
    .expect("metric creation failed")
});

pub static CLEANUP_FAILURES: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "backroom_cleanup_failures_total",
        "Asset URLs that failed best-effort cleanup",
    )
    .expect("metric creation failed")
});

static REGISTER: Once = Once::new();

/// Register all metrics with the global registry.
///
/// Idempotent; safe to call from every entry point.
pub fn register_metrics() {
    REGISTER.call_once(|| {
        let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(IMAGES_UPLOADED.clone()),
            Box::new(UPLOADS_DEDUPLICATED_CACHE.clone()),
            Box::new(UPLOADS_DEDUPLICATED_STORE.clone()),
            Box::new(UPLOAD_ERRORS.clone()),
            Box::new(CLEANUP_FAILURES.clone()),
        ];
        for metric in metrics {
            REGISTRY
                .register(metric)
                .expect("metric registration failed");
        }
    });
}

/// GET /metrics - Prometheus text exposition.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "failed to encode metrics");
        return (StatusCode::INTERNAL_SERVER_ERROR, String::new());
    }
    (
        StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}
