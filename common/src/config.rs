//! Configuration models and loading.
//!
//! Configuration is merged from four tiers, lowest priority first:
//! embedded defaults, `config/default.toml`, the environment-specific
//! `config/<env>.toml`, and prefixed environment variables
//! (`<PREFIX>SERVER__PORT` style). An explicit `--config <path>` file from
//! the CLI slots in before the environment variables. The merged result is
//! validated with garde before use.

use anyhow::Result;
use clap::Parser;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use garde::Validate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Parser, Clone, Debug, Default)]
pub struct Cli {
    /// Path to an additional configuration file
    #[arg(long, env = "CONFIG_FILE")]
    pub config: Option<std::path::PathBuf>,

    /// Environment name (selects config/<env>.toml)
    #[arg(long, env = "ENVIRONMENT")]
    pub environment: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ServerConfig {
    #[garde(range(min = 1024, max = 65535))]
    #[serde(default = "default_port")]
    pub port: u16,

    #[garde(length(min = 1), custom(validate_bind_address))]
    #[serde(default = "default_bind")]
    pub bind: String,

    #[garde(range(min = 1, max = 300))]
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: u64, // seconds
}

fn default_port() -> u16 {
    8080
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

fn validate_bind_address(value: &str, _: &()) -> garde::Result {
    value
        .parse::<std::net::IpAddr>()
        .map(|_| ())
        .map_err(|_| garde::Error::new("Invalid IP address"))
}

/// Load and validate a service configuration using the tiered hierarchy.
pub fn load_config<T>(cli: &Cli, env_prefix: &str) -> Result<T>
where
    T: Default + Serialize + DeserializeOwned + Validate<Context = ()>,
{
    let env_name = cli.environment.clone().unwrap_or_else(|| {
        std::env::var("ENVIRONMENT").unwrap_or_else(|_| "production".to_string())
    });

    let mut figment = Figment::new()
        .merge(Serialized::defaults(T::default()))
        .merge(Toml::file("config/default.toml"))
        .merge(Toml::file(format!("config/{}.toml", env_name)));

    if let Some(path) = &cli.config {
        figment = figment.merge(Toml::file(path));
    }

    let config: T = figment
        .merge(Env::prefixed(env_prefix).split("__"))
        .extract()?;

    config.validate()?;

    Ok(config)
}
