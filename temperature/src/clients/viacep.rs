//! ViaCEP directory lookup: CEP → locality name.

use std::collections::HashMap;

use opentelemetry::Context;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};

use cep_common::error::ApiError;
use cep_common::observability::inject_context;

use crate::config::ViacepConfig;

/// Resolve a CEP to its locality.
///
/// Returns an empty string when the directory knows nothing about the CEP;
/// any transport failure, non-200 status, or undecodable body is a hard
/// error. The response is decoded as a string-to-string map, so the
/// directory's `{"erro": true}` not-found shape also surfaces as a decode
/// error.
#[tracing::instrument(skip(http, config, cx), fields(cep = %cep))]
pub async fn lookup_locality(
    http: &Client,
    config: &ViacepConfig,
    cx: &Context,
    cep: &str,
) -> Result<String, ApiError> {
    let url = format!("{}/ws/{}/json/", config.base_url.trim_end_matches('/'), cep);

    let mut headers = HeaderMap::new();
    inject_context(cx, &mut headers);

    let response = http.get(&url).headers(headers).send().await?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(ApiError::Upstream(format!(
            "unexpected status code: {}",
            status.as_u16()
        )));
    }

    let body = response.bytes().await?;
    let fields: HashMap<String, String> =
        serde_json::from_slice(&body).map_err(|e| ApiError::Upstream(e.to_string()))?;

    Ok(fields.get("localidade").cloned().unwrap_or_default())
}
