use std::time::Duration;

use serde::Deserialize;
use serde_aux::prelude::deserialize_number_from_string;
use url::Url;

/// Where and how to query the ledger for supply figures.
#[derive(Debug, Deserialize, Clone)]
pub struct ChainConfig {
    /// Base url of the Cosmos SDK REST (LCD) endpoint.
    pub lcd_url: Url,
    /// Denom reported when a request doesn't name one.
    pub default_denom: String,
    /// Accounts whose balances don't count towards the circulating supply.
    #[serde(default)]
    pub locked_accounts: Vec<String>,
    #[serde(
        default = "default_timeout_secs",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl ChainConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
