use std::{sync::Arc, time::Duration};

use axum::{
    debug_handler,
    extract::{Query, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use supplylib::{format_amount, scale, Metric, Status, StatusProvider};
use tracing::debug;

use super::SupplyError;

/// Query string of a supply request. Empty values count as absent.
#[derive(Debug, Default, Clone)]
pub struct SupplyQuery {
    pub q: Option<String>,
    pub denom: Option<String>,
    pub decimals: Option<String>,
}

impl SupplyQuery {
    /// Builds the query from raw key/value pairs. A repeated key keeps its
    /// first value, unknown keys are ignored.
    pub fn from_pairs<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut query = Self::default();

        for (key, value) in pairs {
            let slot = match key.as_str() {
                "q" => &mut query.q,
                "denom" => &mut query.denom,
                "decimals" => &mut query.decimals,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }

        query
    }
}

/// Answers supply requests for the denoms of one chain.
///
/// Without `q` the whole status of a denom is returned as json, with `q` a
/// single metric is rendered as a decimal number scaled by `10^decimals`.
#[derive(Clone)]
pub struct SupplyHandler {
    default_denom: Arc<str>,
    provider: Arc<dyn StatusProvider>,
    timeout: Duration,
}

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

impl SupplyHandler {
    pub fn new<I: Into<Arc<str>>>(default_denom: I, provider: Arc<dyn StatusProvider>) -> Self {
        Self {
            default_denom: default_denom.into(),
            provider,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Bounds how long a request may wait on the status provider.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn default_denom(&self) -> &str {
        &self.default_denom
    }

    pub async fn get(&self, query: SupplyQuery) -> Result<Response, SupplyError> {
        let SupplyQuery { q, denom, decimals } = query;

        match non_empty(q) {
            None => self.summary(non_empty(denom)).await,
            Some(q) => self.metric(&q, non_empty(denom), non_empty(decimals)).await,
        }
    }

    async fn summary(&self, denom: Option<String>) -> Result<Response, SupplyError> {
        let denom = denom.as_deref().unwrap_or(self.default_denom());

        let status = self.status(denom).await?;
        let buf = serde_json::to_vec(&status).map_err(SupplyError::Encode)?;

        Ok(([(CONTENT_TYPE, "application/javascript")], buf).into_response())
    }

    async fn metric(
        &self,
        q: &str,
        denom: Option<String>,
        decimals: Option<String>,
    ) -> Result<Response, SupplyError> {
        let denom = denom.ok_or(SupplyError::MissingDenom)?;

        let status = self.status(&denom).await?;
        let metric: Metric = q.parse()?;

        let decimals = decimals.ok_or(SupplyError::MissingDecimals)?;
        let decimals: u16 = decimals.parse().map_err(SupplyError::InvalidDecimals)?;

        let amount = format_amount(status.amount(metric), &scale(decimals));
        debug!(%denom, metric = metric.as_str(), decimals, %amount, "supply metric");

        Ok(([(CONTENT_TYPE, "text/plain")], amount).into_response())
    }

    /// Dropping the provider future on timeout cancels the ledger queries.
    async fn status(&self, denom: &str) -> Result<Status, SupplyError> {
        tokio::time::timeout(self.timeout, self.provider.get_status(denom))
            .await
            .map_err(|_| SupplyError::Timeout(self.timeout))?
            .map_err(SupplyError::from)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[debug_handler]
pub async fn supply(
    State(handler): State<SupplyHandler>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, SupplyError> {
    handler.get(SupplyQuery::from_pairs(pairs)).await
}
