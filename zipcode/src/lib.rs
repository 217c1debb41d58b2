//! Zipcode entry service.
//!
//! Accepts `POST / {"cep": ...}`, validates the CEP shape, and forwards the
//! payload verbatim to the temperature service, relaying its status and
//! body back to the caller.

pub mod config;
pub mod handlers;
pub mod server;

use std::panic;

use anyhow::Result;
use clap::Parser;

pub use handlers::AppState;

/// Main server entry point for the zipcode service.
pub async fn run_server() -> Result<()> {
    cep_common::observability::init_observability("zipcode-api")?;

    // Panic handler set after logging so it can use it.
    panic::set_hook(Box::new(|panic_info| {
        tracing::error!(?panic_info, "FATAL: Panic occurred");
        std::process::exit(1);
    }));

    tracing::info!("Zipcode API starting up");

    let cli = cep_common::config::Cli::parse();
    let config = config::load(&cli)?;

    server::start_server(config).await?;

    cep_common::observability::shutdown_tracing().await;
    Ok(())
}
