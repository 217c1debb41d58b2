//! Zipcode service configuration.
//!
//! Environment variables use the `ZIPCODE_` prefix with `__` nesting,
//! e.g. `ZIPCODE_SERVICE__TEMPERATURE_URL` or `ZIPCODE_SERVER__PORT`.

use anyhow::Result;
use cep_common::config::{load_config, Cli, ServerConfig};
use garde::Validate;
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "ZIPCODE_";

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct ZipcodeConfig {
    #[garde(dive)]
    #[serde(default)]
    pub server: ServerConfig,

    #[garde(dive)]
    #[serde(default)]
    pub service: ServiceConfig,
}

/// Downstream target. The URL has no default and must come from the
/// environment (`ZIPCODE_SERVICE__TEMPERATURE_URL`).
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct ServiceConfig {
    #[garde(length(min = 1))]
    #[serde(default)]
    pub temperature_url: String,
}

pub fn load(cli: &Cli) -> Result<ZipcodeConfig> {
    load_config(cli, ENV_PREFIX)
}
