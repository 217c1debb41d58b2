//! Startup wiring for logging, tracing, and metrics.
//!
//! `init_observability` is called once from each service binary before
//! anything else. It installs the W3C trace-context propagator, builds a
//! single `tracing` subscriber combining the log formatter with the
//! OpenTelemetry export layer, and installs the Prometheus recorder.

use std::env;
use std::time::Duration;

use anyhow::Result;
use opentelemetry::global;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use super::recorder::{init_metrics, MetricsConfig};

/// Configuration for distributed tracing export.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// OTLP endpoint for exporting traces
    pub otlp_endpoint: String,
    /// Sample rate (0.0-1.0). 1.0 = sample all traces
    pub sample_rate: f64,
    /// Service name to identify this service in traces
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Whether trace export is enabled
    pub enabled: bool,
    /// Batch export timeout
    pub export_timeout: Duration,
}

impl TracingConfig {
    pub fn from_env(service_name: &str) -> Self {
        Self {
            otlp_endpoint: env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:4317".to_string()),
            sample_rate: env::var("OTEL_SAMPLE_RATE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1.0),
            service_name: service_name.to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            enabled: env::var("OTEL_TRACES_ENABLED")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(true),
            export_timeout: Duration::from_secs(10),
        }
    }
}

/// Initialize all observability components for a service.
pub fn init_observability(service_name: &str) -> Result<()> {
    let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
    let is_production = environment == "production";

    // Propagator must be installed before any context extraction/injection.
    global::set_text_map_propagator(TraceContextPropagator::new());

    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let tracing_config = TracingConfig::from_env(service_name);

    init_telemetry(&log_level, is_production, &tracing_config)?;

    let metrics_config = MetricsConfig {
        service: service_name.to_string(),
        environment: environment.clone(),
        ip_allowlist: parse_ip_allowlist(),
    };
    init_metrics(metrics_config)?;

    tracing::info!(
        service = %service_name,
        environment = %environment,
        json_logging = %is_production,
        tracing_enabled = %tracing_config.enabled,
        otlp_endpoint = %tracing_config.otlp_endpoint,
        sample_rate = %tracing_config.sample_rate,
        "Observability components initialized"
    );
    Ok(())
}

/// Build the unified subscriber: env-filtered logs plus the optional
/// OpenTelemetry layer, JSON formatting in production.
fn init_telemetry(log_level: &str, json_format: bool, config: &TracingConfig) -> Result<()> {
    let env_filter = EnvFilter::new(log_level);
    let subscriber = tracing_subscriber::registry().with(env_filter);

    match (json_format, config.enabled) {
        (true, true) => {
            let tracer = create_otlp_tracer(config)?;
            let telemetry_layer = tracing_opentelemetry::layer().with_tracer(tracer);
            subscriber
                .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
                .with(telemetry_layer)
                .init();
        }
        (true, false) => {
            subscriber
                .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
                .init();
        }
        (false, true) => {
            let tracer = create_otlp_tracer(config)?;
            let telemetry_layer = tracing_opentelemetry::layer().with_tracer(tracer);
            subscriber
                .with(tracing_subscriber::fmt::layer().pretty())
                .with(telemetry_layer)
                .init();
        }
        (false, false) => {
            subscriber
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

/// Create the OTLP tracer used by the tracing-opentelemetry layer.
fn create_otlp_tracer(config: &TracingConfig) -> Result<opentelemetry_sdk::trace::Tracer> {
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::{
        trace::{self, Sampler},
        Resource,
    };

    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(&config.otlp_endpoint)
        .with_timeout(config.export_timeout);

    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter)
        .with_trace_config(
            trace::config()
                .with_sampler(Sampler::TraceIdRatioBased(config.sample_rate))
                .with_resource(Resource::new(vec![
                    KeyValue::new("service.name", config.service_name.clone()),
                    KeyValue::new("service.version", config.service_version.clone()),
                    KeyValue::new("environment", config.environment.clone()),
                    KeyValue::new("telemetry.sdk.name", "opentelemetry"),
                    KeyValue::new("telemetry.sdk.language", "rust"),
                ])),
        )
        .install_batch(opentelemetry_sdk::runtime::Tokio)?;

    Ok(tracer)
}

/// Flush pending spans on shutdown.
pub async fn shutdown_tracing() {
    global::shutdown_tracer_provider();
}

fn parse_ip_allowlist() -> Option<Vec<String>> {
    parse_ip_allowlist_from_var("METRICS_IP_ALLOWLIST")
}

fn parse_ip_allowlist_from_var(var_name: &str) -> Option<Vec<String>> {
    env::var(var_name).ok().and_then(|allowlist_str| {
        if allowlist_str.trim().is_empty() {
            None
        } else {
            Some(
                allowlist_str
                    .split(',')
                    .map(|ip| ip.trim().to_string())
                    .filter(|ip| !ip.is_empty())
                    .collect(),
            )
        }
    })
}
