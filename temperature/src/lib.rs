//! Temperature front service.
//!
//! Accepts `POST / {"cep": ...}`, resolves the CEP to a locality through
//! the ViaCEP directory, resolves the locality to a current temperature
//! through the WeatherAPI provider, and answers with the reading in
//! Celsius, Kelvin, and Fahrenheit.

pub mod clients;
pub mod config;
pub mod handlers;
pub mod server;

use std::panic;

use anyhow::Result;
use clap::Parser;

pub use handlers::AppState;

/// Main server entry point for the temperature service.
pub async fn run_server() -> Result<()> {
    cep_common::observability::init_observability("temperature-api")?;

    // Panic handler set after logging so it can use it.
    panic::set_hook(Box::new(|panic_info| {
        tracing::error!(?panic_info, "FATAL: Panic occurred");
        std::process::exit(1);
    }));

    tracing::info!("Temperature API starting up");

    let cli = cep_common::config::Cli::parse();
    let config = config::load(&cli)?;

    server::start_server(config).await?;

    cep_common::observability::shutdown_tracing().await;
    Ok(())
}
