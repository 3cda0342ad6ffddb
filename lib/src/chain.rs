use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::{try_join, try_join3, try_join_all};
use num_bigint::BigUint;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, trace};
use url::Url;

use crate::{amount::serde::as_str, configuration::ChainConfig, Coin, Status};

/// Source of supply snapshots.
///
/// Implementations must not leave work running when the returned future is
/// dropped: that is how a disconnected client or an expired request
/// deadline cancels the query.
#[async_trait]
pub trait StatusProvider: Send + Sync {
    async fn get_status(&self, denom: &str) -> Result<Status, StatusError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("could not build lcd client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("invalid lcd url: {0}")]
    Url(#[from] url::ParseError),
    #[error("request to {url} failed: {source}")]
    Request {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} returned {status}: {body}")]
    Status {
        url: Url,
        status: StatusCode,
        body: String,
    },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
}

/// Reads supply figures from a Cosmos SDK REST (LCD) endpoint.
#[derive(Debug, Clone)]
pub struct LcdStatusProvider {
    client: Client,
    base: Url,
    locked_accounts: Vec<String>,
}

impl LcdStatusProvider {
    pub fn new(
        mut base: Url,
        locked_accounts: Vec<String>,
        timeout: Duration,
    ) -> Result<Self, StatusError> {
        // keep any path prefix of the base url when joining endpoints onto it
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(StatusError::Client)?;

        Ok(Self {
            client,
            base,
            locked_accounts,
        })
    }

    async fn total_supply(&self, denom: &str) -> Result<Coin, StatusError> {
        let response: SupplyOfResponse = self
            .get("cosmos/bank/v1beta1/supply/by_denom", &[("denom", denom)])
            .await?;

        Ok(response.amount)
    }

    async fn locked_balance(&self, address: &str, denom: &str) -> Result<BigUint, StatusError> {
        let response: BalanceResponse = self
            .get(
                &format!("cosmos/bank/v1beta1/balances/{address}/by_denom"),
                &[("denom", denom)],
            )
            .await?;
        trace!(address, balance = %response.balance, "locked balance");

        Ok(response.balance.amount)
    }

    /// Bonded tokens only exist in the staking denom, any other denom has
    /// nothing bonded.
    async fn bonded(&self, denom: &str) -> Result<Coin, StatusError> {
        let (pool, params) = try_join(
            self.get::<PoolResponse>("cosmos/staking/v1beta1/pool", &[]),
            self.get::<ParamsResponse>("cosmos/staking/v1beta1/params", &[]),
        )
        .await?;

        if params.params.bond_denom == denom {
            Ok(Coin::new(pool.pool.bonded_tokens, denom))
        } else {
            Ok(Coin::zero(denom))
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, StatusError> {
        let mut url = self.base.join(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        trace!(%url, "lcd request");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| StatusError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StatusError::Status { url, status, body });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| StatusError::Decode { url, source })
    }
}

impl TryFrom<&ChainConfig> for LcdStatusProvider {
    type Error = StatusError;

    fn try_from(config: &ChainConfig) -> Result<Self, Self::Error> {
        LcdStatusProvider::new(
            config.lcd_url.clone(),
            config.locked_accounts.clone(),
            config.timeout(),
        )
    }
}

#[async_trait]
impl StatusProvider for LcdStatusProvider {
    async fn get_status(&self, denom: &str) -> Result<Status, StatusError> {
        debug!(denom, "querying supply status");

        let locked = try_join_all(
            self.locked_accounts
                .iter()
                .map(|address| self.locked_balance(address, denom)),
        );

        let (total, bonded, locked) =
            try_join3(self.total_supply(denom), self.bonded(denom), locked).await?;

        let locked: BigUint = locked.into_iter().sum();
        let circulating = if total.amount > locked {
            Coin::new(&total.amount - &locked, denom)
        } else {
            Coin::zero(denom)
        };

        let status = Status {
            total,
            circulating,
            bonded,
        };
        debug!(
            denom,
            total = %status.total,
            circulating = %status.circulating,
            bonded = %status.bonded,
            "supply status"
        );

        Ok(status)
    }
}

#[derive(Deserialize, Debug)]
struct SupplyOfResponse {
    amount: Coin,
}

#[derive(Deserialize, Debug)]
struct BalanceResponse {
    balance: Coin,
}

#[derive(Deserialize, Debug)]
struct PoolResponse {
    pool: Pool,
}

#[derive(Deserialize, Debug)]
struct Pool {
    #[serde(with = "as_str")]
    bonded_tokens: BigUint,
}

#[derive(Deserialize, Debug)]
struct ParamsResponse {
    params: StakingParams,
}

#[derive(Deserialize, Debug)]
struct StakingParams {
    bond_denom: String,
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, str::FromStr};

    use axum::{
        extract::{Path, Query},
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::get,
        Json, Router,
    };
    use serde_json::json;
    use tracing_test::traced_test;

    use super::*;

    const FOUNDATION: &str = "cosmos1foundation";
    const TEAM: &str = "cosmos1team";

    async fn supply_of(Query(query): Query<HashMap<String, String>>) -> Response {
        let denom = query.get("denom").cloned().unwrap_or_default();
        let amount = match denom.as_str() {
            "uatom" => "1000000000000000000000000",
            "uosmo" => "7000000",
            "tiny" => "10",
            "garbage" => "12abc",
            "broken" => {
                return (StatusCode::INTERNAL_SERVER_ERROR, "codespace sdk code 1").into_response()
            }
            _ => "0",
        };

        Json(json!({ "amount": { "denom": denom, "amount": amount } })).into_response()
    }

    async fn balance(
        Path(address): Path<String>,
        Query(query): Query<HashMap<String, String>>,
    ) -> Json<serde_json::Value> {
        let amount = match address.as_str() {
            FOUNDATION => "100000000000000000000000",
            TEAM => "50000000000000000000000",
            _ => "0",
        };

        Json(json!({ "balance": { "denom": query["denom"], "amount": amount } }))
    }

    async fn fake_lcd() -> Url {
        let app = Router::new()
            .route("/api/cosmos/bank/v1beta1/supply/by_denom", get(supply_of))
            .route(
                "/api/cosmos/bank/v1beta1/balances/:address/by_denom",
                get(balance),
            )
            .route(
                "/api/cosmos/staking/v1beta1/pool",
                get(|| async {
                    Json(json!({
                        "pool": {
                            "not_bonded_tokens": "5",
                            "bonded_tokens": "250000000000000000000000"
                        }
                    }))
                }),
            )
            .route(
                "/api/cosmos/staking/v1beta1/params",
                get(|| async {
                    Json(json!({
                        "params": { "bond_denom": "uatom", "unbonding_time": "1814400s" }
                    }))
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        Url::parse(&format!("http://{addr}/api")).unwrap()
    }

    async fn provider(locked_accounts: &[&str]) -> LcdStatusProvider {
        LcdStatusProvider::new(
            fake_lcd().await,
            locked_accounts.iter().map(|a| a.to_string()).collect(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn big(s: &str) -> BigUint {
        BigUint::from_str(s).unwrap()
    }

    #[tokio::test]
    #[traced_test]
    async fn status_of_bond_denom() {
        let provider = provider(&[FOUNDATION, TEAM]).await;

        let status = provider.get_status("uatom").await.unwrap();

        assert_eq!(status.total.amount, big("1000000000000000000000000"));
        assert_eq!(status.circulating.amount, big("850000000000000000000000"));
        assert_eq!(status.bonded.amount, big("250000000000000000000000"));
        assert_eq!(status.total.denom, "uatom");
        assert_eq!(status.circulating.denom, "uatom");
        assert_eq!(status.bonded.denom, "uatom");
    }

    #[tokio::test]
    async fn status_without_locked_accounts() {
        let provider = provider(&[]).await;

        let status = provider.get_status("uosmo").await.unwrap();

        assert_eq!(status.total, Coin::new(big("7000000"), "uosmo"));
        assert_eq!(status.circulating, status.total);
        assert_eq!(status.bonded, Coin::zero("uosmo"));
    }

    #[tokio::test]
    async fn circulating_never_underflows() {
        let provider = provider(&[FOUNDATION]).await;

        let status = provider.get_status("tiny").await.unwrap();

        assert_eq!(status.total.amount, big("10"));
        assert_eq!(status.circulating, Coin::zero("tiny"));
    }

    #[tokio::test]
    async fn lcd_error_status() {
        let provider = provider(&[]).await;

        let err = provider.get_status("broken").await.unwrap_err();

        match err {
            StatusError::Status { status, body, .. } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, "codespace sdk code 1");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn undecodable_amount() {
        let provider = provider(&[]).await;

        let err = provider.get_status("garbage").await.unwrap_err();

        assert!(matches!(err, StatusError::Decode { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn unreachable_lcd() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let provider = LcdStatusProvider::new(
            Url::parse(&format!("http://{addr}")).unwrap(),
            vec![],
            Duration::from_secs(1),
        )
        .unwrap();

        let err = provider.get_status("uatom").await.unwrap_err();

        assert!(matches!(err, StatusError::Request { .. }), "{err:?}");
        assert!(err.to_string().contains(&addr.to_string()));
    }

    #[test]
    fn from_chain_config() {
        let config: ChainConfig = serde_json::from_value(json!({
            "lcd_url": "http://127.0.0.1:1317/rest",
            "default_denom": "uatom",
            "locked_accounts": [FOUNDATION],
        }))
        .unwrap();

        let provider = LcdStatusProvider::try_from(&config).unwrap();

        assert_eq!(provider.base.as_str(), "http://127.0.0.1:1317/rest/");
        assert_eq!(provider.locked_accounts, vec![FOUNDATION.to_string()]);
    }
}
