//! HTTP server runtime for the temperature service.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::oneshot;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use cep_common::middleware::{metrics_middleware, request_context_middleware};
use cep_common::observability::metrics_endpoint;

use crate::config::TemperatureConfig;
use crate::handlers::{self, AppState};

/// Fixed ceiling for the whole request, outbound calls included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Start the Axum HTTP server with graceful shutdown.
pub async fn start_server(config: TemperatureConfig) -> Result<()> {
    info!(
        "Starting temperature API on {}:{}",
        config.server.bind, config.server.port
    );

    let bind_addr = format!("{}:{}", config.server.bind, config.server.port);
    let drain_timeout = Duration::from_secs(config.server.shutdown_timeout);
    let state = AppState::new(config)?;
    let app = create_router(state);

    let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to bind to {}: {}. Is another process using this port?",
            bind_addr,
            e
        )
    })?;
    info!("Server bound to {}", bind_addr);

    serve(listener, app, shutdown_signal(), drain_timeout).await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Serve until `shutdown` resolves, then give in-flight requests up to
/// `drain_timeout` to finish before abandoning the wait.
pub async fn serve<F>(
    listener: TcpListener,
    app: Router,
    shutdown: F,
    drain_timeout: Duration,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (drain_tx, drain_rx) = oneshot::channel();
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown.await;
        let _ = drain_tx.send(());
    });

    tokio::select! {
        result = async { server.await } => result?,
        // The drain clock starts when the shutdown signal fires.
        _ = async {
            let _ = drain_rx.await;
            tokio::time::sleep(drain_timeout).await;
        } => {
            warn!(?drain_timeout, "Graceful shutdown timed out, abandoning drain");
        }
    }

    Ok(())
}

/// Create the router with all middleware and routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(metrics_endpoint))
        .route("/health", get(liveness_handler))
        .route("/", post(handlers::handle_request))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_context_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

async fn liveness_handler() -> &'static str {
    "OK"
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
