//! Service error type shared by both services.
//!
//! Every failure is translated to an HTTP status at the point of detection
//! and surfaced directly to the caller; nothing is retried.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Request body could not be decoded as JSON.
    #[error("{0}")]
    BadRequest(String),

    #[error("missing zipcode")]
    MissingZipcode,

    #[error("invalid zipcode")]
    InvalidZipcode,

    /// The directory lookup returned no locality for the CEP.
    #[error("cannot find zipcode")]
    ZipcodeNotFound,

    /// Transport or decode failure talking to an upstream service.
    #[error("{0}")]
    Upstream(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) | ApiError::MissingZipcode | ApiError::InvalidZipcode => {
                StatusCode::BAD_REQUEST
            }
            ApiError::ZipcodeNotFound => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Upstream(err.to_string())
    }
}
