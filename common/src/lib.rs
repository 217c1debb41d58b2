//! Shared building blocks for the CEP weather service chain.
//!
//! Both the `zipcode-api` entry service and the `temperature-api` front
//! service are wired from the same parts: configuration loading, a common
//! error type, HTTP middleware, and the observability stack (structured
//! logging, OpenTelemetry trace propagation, Prometheus metrics).

pub mod cep;
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;

pub use error::ApiError;
