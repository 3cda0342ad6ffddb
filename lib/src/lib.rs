use std::{fmt::Display, str::FromStr};

pub use num_bigint::BigUint;
pub use serde::{Deserialize, Serialize};

pub mod amount;
pub mod chain;
pub mod configuration;

pub use amount::{format_amount, scale};
pub use chain::{LcdStatusProvider, StatusError, StatusProvider};

/// An amount of base units of a single denom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    #[serde(with = "amount::serde::as_str")]
    pub amount: BigUint,
    pub denom: String,
}

impl Coin {
    pub fn new<I: Into<String>>(amount: BigUint, denom: I) -> Self {
        Self {
            amount,
            denom: denom.into(),
        }
    }

    pub fn zero<I: Into<String>>(denom: I) -> Self {
        Self::new(BigUint::default(), denom)
    }
}

impl Display for Coin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}{}", self.amount, self.denom))
    }
}

/// Supply snapshot of one denom, taken when it was requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub total: Coin,
    pub circulating: Coin,
    pub bonded: Coin,
}

impl Status {
    pub fn amount(&self, metric: Metric) -> &BigUint {
        match metric {
            Metric::Total => &self.total.amount,
            Metric::Circulating => &self.circulating.amount,
            Metric::Bonded => &self.bonded.amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Total,
    Circulating,
    Bonded,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Total => "total",
            Metric::Circulating => "circulating",
            Metric::Bonded => "bonded",
        }
    }
}

impl FromStr for Metric {
    type Err = MetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "total" => Ok(Self::Total),
            "circulating" => Ok(Self::Circulating),
            "bonded" => Ok(Self::Bonded),
            other => Err(MetricError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("wrong query value, allowed values are `total`, `circulating`, `bonded`")]
pub struct MetricError(pub String);
