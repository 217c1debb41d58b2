//! Temperature service configuration.
//!
//! Environment variables use the `TEMPERATURE_` prefix with `__` nesting,
//! e.g. `TEMPERATURE_WEATHER__API_KEY` or `TEMPERATURE_SERVER__PORT`.

use anyhow::Result;
use cep_common::config::{load_config, Cli, ServerConfig};
use garde::Validate;
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "TEMPERATURE_";

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct TemperatureConfig {
    #[garde(dive)]
    #[serde(default)]
    pub server: ServerConfig,

    #[garde(dive)]
    #[serde(default)]
    pub viacep: ViacepConfig,

    #[garde(dive)]
    #[serde(default)]
    pub weather: WeatherConfig,
}

/// ViaCEP directory lookup.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ViacepConfig {
    #[garde(length(min = 1))]
    #[serde(default = "default_viacep_base_url")]
    pub base_url: String,
}

fn default_viacep_base_url() -> String {
    "https://viacep.com.br".to_string()
}

impl Default for ViacepConfig {
    fn default() -> Self {
        Self {
            base_url: default_viacep_base_url(),
        }
    }
}

/// WeatherAPI provider. The API key has no default and must come from the
/// environment (`TEMPERATURE_WEATHER__API_KEY`).
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct WeatherConfig {
    #[garde(length(min = 1))]
    #[serde(default)]
    pub api_key: String,

    #[garde(length(min = 1))]
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
}

fn default_weather_base_url() -> String {
    "https://api.weatherapi.com".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_weather_base_url(),
        }
    }
}

pub fn load(cli: &Cli) -> Result<TemperatureConfig> {
    load_config(cli, ENV_PREFIX)
}
