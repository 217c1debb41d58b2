//! Observability for the service chain:
//! - structured logging and OpenTelemetry tracing in one subscriber
//! - W3C trace-context propagation helpers for the outbound HTTP clients
//! - Prometheus metrics recorder and exposition endpoint

pub mod endpoint;
pub mod init;
pub mod metrics;
pub mod propagation;
pub mod recorder;

pub use endpoint::metrics_endpoint;
pub use init::{init_observability, shutdown_tracing, TracingConfig};
pub use metrics::{bucket_status_code, record_http_request};
pub use propagation::{extract_context, inject_context};
pub use recorder::{extract_client_ip, get_metrics_manager, init_metrics, MetricsConfig};
