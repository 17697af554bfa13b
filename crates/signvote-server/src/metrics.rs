//! Prometheus metrics.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Install the global Prometheus recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // Frame loop
    pub const FRAMES_TOTAL: &str = "signvote_frames_total";
    pub const FRAME_DURATION_SECONDS: &str = "signvote_frame_duration_seconds";
    pub const EVENTS_TOTAL: &str = "signvote_events_total";
    pub const RECORDS_TOTAL: &str = "signvote_records_total";

    // Feedback
    pub use signvote_engine::feedback::FEEDBACK_DROPPED_TOTAL;

    // HTTP
    pub const HTTP_REQUESTS_TOTAL: &str = "signvote_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "signvote_http_request_duration_seconds";
}

/// Record one processed frame.
pub fn record_frame(observation: &'static str, duration_secs: f64) {
    counter!(names::FRAMES_TOTAL, "observation" => observation).increment(1);
    histogram!(names::FRAME_DURATION_SECONDS).record(duration_secs);
}

/// Record an emitted vote event.
pub fn record_event(kind: &'static str) {
    counter!(names::EVENTS_TOTAL, "kind" => kind).increment(1);
}

/// Record a line written to the record stream.
pub fn record_published(gesture: &'static str) {
    counter!(names::RECORDS_TOTAL, "gesture" => gesture).increment(1);
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", route_label(path).to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Collapse unknown paths so scanners cannot blow up label cardinality.
fn route_label(path: &str) -> &str {
    match path {
        "/gesture" | "/health" | "/healthz" | "/metrics" => path,
        _ => "other",
    }
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}
