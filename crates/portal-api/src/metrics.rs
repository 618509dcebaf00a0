//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "portal_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "portal_http_request_duration_seconds";

    // Intake metrics
    pub const CITIZEN_REQUESTS_TOTAL: &str = "portal_citizen_requests_total";
    pub const CPF_REJECTIONS_TOTAL: &str = "portal_cpf_rejections_total";

    // Media metrics
    pub const IMAGES_NORMALIZED_TOTAL: &str = "portal_images_normalized_total";
    pub const IMAGE_REJECTS_TOTAL: &str = "portal_image_rejects_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record the outcome of a citizen-request submission.
pub fn record_citizen_request(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::CITIZEN_REQUESTS_TOTAL, &labels).increment(1);
}

/// Record a CPF validation rejection by reason.
pub fn record_cpf_rejection(reason: &portal_models::CpfError) {
    let reason = match reason {
        portal_models::CpfError::WrongLength => "wrong_length",
        portal_models::CpfError::AllDigitsEqual => "all_digits_equal",
        portal_models::CpfError::InvalidChecksum1 => "invalid_checksum_1",
        portal_models::CpfError::InvalidChecksum2 => "invalid_checksum_2",
    };
    let labels = [("reason", reason.to_string())];
    counter!(names::CPF_REJECTIONS_TOTAL, &labels).increment(1);
}

/// Record a successfully normalized carousel image.
pub fn record_image_normalized() {
    counter!(names::IMAGES_NORMALIZED_TOTAL).increment(1);
}

/// Record an upload rejected as undecodable.
pub fn record_image_rejected() {
    counter!(names::IMAGE_REJECTS_TOTAL).increment(1);
}

/// Middleware recording per-request counters and latencies.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    record_http_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}

/// Collapse numeric path segments so ids don't explode label cardinality.
fn sanitize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()) {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
