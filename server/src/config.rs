use std::{net::IpAddr, path::Path, time::Duration};

use anyhow::{anyhow, Result};
use serde::Deserialize;
use serde_aux::prelude::deserialize_number_from_string;
use supplylib::configuration::ChainConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub application: AppConfig,
    pub http: HttpConfig,
    pub chain: ChainConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub trace_level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub host: IpAddr,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    #[serde(
        default = "default_request_timeout_secs",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub fn app_config(config_dir: &Path) -> Result<Config> {
    // Detect the running environment.
    // Default to `local` if unspecified.
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()?;
    let environment_filename = format!("{}.json", environment.as_str());
    let config = config::Config::builder()
        .add_source(config::File::from(config_dir.join("base.json")))
        .add_source(config::File::from(config_dir.join(environment_filename)).required(false))
        // Add in settings from environment variables (with a prefix of APP and '__' as separator)
        // E.g. `APP_HTTP__PORT=5001 would set `Config.http.port`
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("chain.locked_accounts"),
        )
        .build()?;

    config.try_deserialize::<Config>().map_err(|e| e.into())
}

pub enum Environment {
    Local,
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Development => "dev",
            Environment::Staging => "sta",
            Environment::Production => "prod",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "dev" => Ok(Self::Development),
            "sta" => Ok(Self::Staging),
            "prod" => Ok(Self::Production),
            other => Err(anyhow!(
                "Could not convert env string to enum variant: {other}"
            )),
        }
    }
}
