use std::{num::ParseIntError, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use supplylib::{chain::StatusError, MetricError};

/// Every way a supply request can fail. The response body is always the
/// plain text rendering of the error.
#[derive(Debug, thiserror::Error)]
pub enum SupplyError {
    #[error("`denom` value is required")]
    MissingDenom,
    #[error("`decimals` value is required")]
    MissingDecimals,
    #[error("{0}")]
    InvalidDecimals(#[source] ParseIntError),
    #[error(transparent)]
    InvalidMetric(#[from] MetricError),
    #[error(transparent)]
    Status(#[from] StatusError),
    #[error("supply status query timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Encode(serde_json::Error),
}

impl SupplyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SupplyError::MissingDenom
            | SupplyError::MissingDecimals
            | SupplyError::InvalidDecimals(_) => StatusCode::BAD_REQUEST,
            SupplyError::InvalidMetric(_)
            | SupplyError::Status(_)
            | SupplyError::Timeout(_)
            | SupplyError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SupplyError {
    fn into_response(self) -> Response {
        match &self {
            SupplyError::Status(err) => {
                // `TraceLayer` already puts the request in the span
                tracing::error!(%err, "could not get supply status");
            }
            SupplyError::Timeout(timeout) => {
                tracing::error!(?timeout, "supply status query timed out");
            }
            SupplyError::Encode(err) => {
                tracing::error!(%err, "could not encode supply status");
            }
            // bad user input, don't log
            _ => {}
        }

        (self.status_code(), self.to_string()).into_response()
    }
}
