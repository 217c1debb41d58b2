//! HTTP request metrics.
//!
//! Status codes are bucketed (2xx/3xx/4xx/5xx) to keep label cardinality
//! bounded; the route set is fixed so paths are safe to label directly.

use std::time::Duration;

use metrics::{counter, histogram};

use super::recorder::get_metrics_manager;

/// Bucket HTTP status codes to control cardinality.
pub fn bucket_status_code(status: u16) -> &'static str {
    match status {
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

/// Record one handled HTTP request.
pub async fn record_http_request(method: &str, path: &str, status_code: u16, duration: Duration) {
    if get_metrics_manager().is_err() {
        // Recorder not installed (tests, early startup); nothing to record.
        return;
    }

    let status_bucket = bucket_status_code(status_code);

    counter!(
        "http_request_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_bucket.to_string()
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_bucket.to_string()
    )
    .record(duration.as_secs_f64());

    tracing::debug!(
        method = %method,
        path = %path,
        status = %status_bucket,
        duration_ms = %duration.as_millis(),
        "HTTP request metrics recorded"
    );
}
