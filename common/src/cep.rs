//! Request/response payloads and temperature conversions.

use serde::{Deserialize, Serialize};

/// Brazilian CEPs are exactly eight characters; length is the only gate.
pub const CEP_LENGTH: usize = 8;

/// Inbound body for both services. `cep` is optional so that a present-but-
/// missing field can be reported as "missing zipcode" rather than as a
/// decode failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CepRequest {
    pub cep: Option<String>,
}

/// Response body of the temperature service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureResponse {
    #[serde(rename = "temp_C")]
    pub temp_c: f64,
    #[serde(rename = "temp_K")]
    pub temp_k: f64,
    #[serde(rename = "temp_F")]
    pub temp_f: f64,
}

impl TemperatureResponse {
    /// Derive Kelvin and Fahrenheit from a Celsius reading.
    ///
    /// Fahrenheit multiplies before dividing to keep fractional precision.
    pub fn from_celsius(temp_c: f64) -> Self {
        Self {
            temp_c,
            temp_k: temp_c + 273.15,
            temp_f: (temp_c * 9.0) / 5.0 + 32.0,
        }
    }
}

pub fn is_valid_cep(cep: &str) -> bool {
    cep.len() == CEP_LENGTH
}
