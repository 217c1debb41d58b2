//! Request handler: validate, resolve locality, resolve temperature,
//! convert units.
//!
//! The pipeline is strictly sequential; each step either proceeds or
//! short-circuits to an error response. Nothing persists between requests.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{info_span, Instrument};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use cep_common::cep::{is_valid_cep, CepRequest, TemperatureResponse};
use cep_common::error::ApiError;
use cep_common::observability::extract_context;

use crate::clients::{viacep, weather};
use crate::config::TemperatureConfig;
use crate::server::REQUEST_TIMEOUT;

/// Shared, read-only collaborators: configuration and the outbound HTTP
/// connection pool.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<TemperatureConfig>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: TemperatureConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }
}

/// `POST /` — resolve a CEP to a temperature reading in three units.
pub async fn handle_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CepRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    // Extracted once on ingress, then passed to every outbound call.
    let cx = extract_context(&headers);

    let span = info_span!("temperature_request");
    span.set_parent(cx.clone());

    async move {
        let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
        let cep = payload.cep.ok_or(ApiError::MissingZipcode)?;
        if !is_valid_cep(&cep) {
            return Err(ApiError::InvalidZipcode);
        }

        let locality =
            viacep::lookup_locality(&state.http, &state.config.viacep, &cx, &cep).await?;
        if locality.is_empty() {
            return Err(ApiError::ZipcodeNotFound);
        }

        let temp_c =
            weather::current_celsius(&state.http, &state.config.weather, &cx, &locality).await?;

        Ok(Json(TemperatureResponse::from_celsius(temp_c)).into_response())
    }
    .instrument(span)
    .await
}
