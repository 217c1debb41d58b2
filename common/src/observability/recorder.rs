//! Prometheus metrics recorder.
//!
//! The recorder is installed once at startup and held behind a process-wide
//! manager; the `/metrics` route renders its output on demand. Access to the
//! endpoint can be restricted with an IP allowlist.

use std::sync::{Arc, OnceLock};

use anyhow::{anyhow, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Configuration for metrics collection.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Service name attached as a global label
    pub service: String,
    /// Service environment (development, staging, production)
    pub environment: String,
    /// Optional IP allowlist for metrics endpoint access
    pub ip_allowlist: Option<Vec<String>>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            service: env!("CARGO_PKG_NAME").to_string(),
            environment: "development".to_string(),
            ip_allowlist: None,
        }
    }
}

/// Process-wide metrics manager wrapping the Prometheus recorder handle.
pub struct MetricsManager {
    handle: PrometheusHandle,
    config: MetricsConfig,
}

impl MetricsManager {
    pub fn new(config: MetricsConfig) -> Result<Self> {
        let builder = PrometheusBuilder::new()
            .add_global_label("service", &config.service)
            .add_global_label("environment", &config.environment)
            .add_global_label("version", env!("CARGO_PKG_VERSION"));

        let handle = builder
            .install_recorder()
            .map_err(|e| anyhow!("Failed to install Prometheus recorder: {}", e))?;

        tracing::info!(
            service = %config.service,
            environment = %config.environment,
            "Prometheus metrics recorder initialized"
        );

        Ok(Self { handle, config })
    }

    /// Render the Prometheus text exposition.
    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// Check whether an IP may read the metrics endpoint.
    pub fn is_ip_allowed(&self, ip: &str) -> bool {
        ip_allowed(&self.config.ip_allowlist, ip)
    }
}

static METRICS_MANAGER: OnceLock<Arc<MetricsManager>> = OnceLock::new();

/// Initialize the global metrics manager. Fails if called twice.
pub fn init_metrics(config: MetricsConfig) -> Result<()> {
    let manager = Arc::new(MetricsManager::new(config)?);

    match METRICS_MANAGER.set(manager) {
        Ok(()) => Ok(()),
        Err(_) => Err(anyhow!("Metrics manager was already initialized")),
    }
}

/// Get the global metrics manager instance.
pub fn get_metrics_manager() -> Result<Arc<MetricsManager>> {
    METRICS_MANAGER
        .get()
        .cloned()
        .ok_or_else(|| anyhow!("Metrics manager not initialized. Call init_metrics() first."))
}

fn ip_allowed(allowlist: &Option<Vec<String>>, ip: &str) -> bool {
    match allowlist {
        Some(allowlist) => allowlist.iter().any(|allowed| allowed == ip),
        None => true,
    }
}

/// Resolve the client IP from proxy headers, falling back to "unknown".
pub fn extract_client_ip(headers: &axum::http::HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            // Take the first IP in case of multiple hops
            if let Some(first_ip) = forwarded_str.split(',').next() {
                return first_ip.trim().to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return ip_str.to_string();
        }
    }

    "unknown".to_string()
}
