//! Proxy handler: validate the CEP, forward to the temperature service,
//! relay its response untouched.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{info_span, Instrument};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use cep_common::cep::{is_valid_cep, CepRequest};
use cep_common::error::ApiError;
use cep_common::observability::{extract_context, inject_context};

use crate::config::ZipcodeConfig;
use crate::server::REQUEST_TIMEOUT;

/// Shared, read-only collaborators: configuration and the outbound HTTP
/// connection pool.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ZipcodeConfig>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: ZipcodeConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }
}

/// `POST /` — validate and forward. Once the CEP passes validation this is
/// a pure pass-through: the upstream status and raw body are relayed
/// unmodified.
pub async fn handle_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CepRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let cx = extract_context(&headers);

    let span = info_span!("zipcode_request");
    span.set_parent(cx.clone());

    async move {
        let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
        let cep = payload.cep.ok_or(ApiError::MissingZipcode)?;
        if !is_valid_cep(&cep) {
            return Err(ApiError::InvalidZipcode);
        }

        let mut outbound_headers = reqwest::header::HeaderMap::new();
        inject_context(&cx, &mut outbound_headers);

        let response = state
            .http
            .post(&state.config.service.temperature_url)
            .headers(outbound_headers)
            .json(&serde_json::json!({ "cep": cep }))
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if status != StatusCode::OK {
            return Ok((status, body).into_response());
        }

        Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response())
    }
    .instrument(span)
    .await
}
