//! WeatherAPI lookup: locality → current temperature in Celsius.

use opentelemetry::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use cep_common::error::ApiError;
use cep_common::observability::inject_context;

use crate::config::WeatherConfig;

/// Typed view of the provider response. Both levels are optional so that a
/// missing or mistyped field is an explicit "no data" branch rather than a
/// decode failure.
#[derive(Debug, Deserialize)]
struct WeatherResponse {
    current: Option<CurrentConditions>,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    temp_c: Option<f64>,
}

/// Resolve the current temperature for a locality.
///
/// Soft-failure policy: a non-200 status or an unexpected response shape is
/// not an error; the reading silently defaults to 0 °C and the request
/// succeeds. Only transport failures are hard errors.
#[tracing::instrument(skip(http, config, cx), fields(locality = %locality))]
pub async fn current_celsius(
    http: &Client,
    config: &WeatherConfig,
    cx: &Context,
    locality: &str,
) -> Result<f64, ApiError> {
    let url = format!("{}/v1/current.json", config.base_url.trim_end_matches('/'));

    let mut headers = HeaderMap::new();
    headers.insert("accept", HeaderValue::from_static("application/json"));
    headers.insert(
        "key",
        HeaderValue::from_str(&config.api_key).map_err(|e| ApiError::Upstream(e.to_string()))?,
    );
    inject_context(cx, &mut headers);

    let response = http
        .get(&url)
        .query(&[("q", locality)])
        .headers(headers)
        .send()
        .await?;

    let status = response.status();
    if status != StatusCode::OK {
        let raw = response.text().await.unwrap_or_default();
        tracing::warn!(
            status = %status,
            body = %raw,
            "weather provider returned non-200, defaulting to 0C"
        );
        return Ok(0.0);
    }

    let body = response.bytes().await?;
    let parsed: WeatherResponse = match serde_json::from_slice(&body) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "undecodable weather payload, defaulting to 0C");
            return Ok(0.0);
        }
    };

    Ok(parsed.current.and_then(|c| c.temp_c).unwrap_or(0.0))
}
