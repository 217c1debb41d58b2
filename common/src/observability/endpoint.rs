//! Prometheus exposition endpoint.

use std::net::SocketAddr;

use axum::{
    extract::ConnectInfo,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use super::recorder::{extract_client_ip, get_metrics_manager};

/// `GET /metrics` handler with optional IP allowlist enforcement.
pub async fn metrics_endpoint(
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Response {
    let manager = match get_metrics_manager() {
        Ok(manager) => manager,
        Err(e) => {
            tracing::error!("Metrics manager not initialized: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Metrics not available").into_response();
        }
    };

    // Prefer proxy headers, fall back to the connection address.
    let client_ip = {
        let header_ip = extract_client_ip(&headers);
        if header_ip == "unknown" {
            addr.ip().to_string()
        } else {
            header_ip
        }
    };

    if !manager.is_ip_allowed(&client_ip) {
        tracing::warn!(
            client_ip = %client_ip,
            "Metrics access denied: IP not in allowlist"
        );
        return (StatusCode::FORBIDDEN, "Access denied: IP not authorized").into_response();
    }

    let metrics_content = manager.render();

    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        metrics_content,
    )
        .into_response()
}
