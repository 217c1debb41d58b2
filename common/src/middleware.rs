//! Cross-cutting HTTP middleware shared by both services.
//!
//! Request-scoped context (request id, client IP, request span) and metrics
//! recording. Panic recovery, the request timeout, and access logging come
//! from tower-http layers wired in each service's router.

use std::time::Instant;

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::observability::{extract_client_ip, record_http_request};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Tag every request with a generated id and the resolved client IP, and
/// run the handler inside a request span. The id is echoed back to the
/// caller in the `x-request-id` response header.
pub async fn request_context_middleware(req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let client_ip = extract_client_ip(req.headers());

    let span = info_span!(
        "http_request",
        method = %req.method(),
        path = %req.uri().path(),
        request_id = %request_id,
        client_ip = %client_ip,
    );

    let mut response = next.run(req).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Record request count and duration for every handled request.
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    let status = response.status().as_u16();

    record_http_request(&method, &path, status, start.elapsed()).await;

    response
}
