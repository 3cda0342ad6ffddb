use axum::{
    extract::{MatchedPath, Request},
    routing::get,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    trace::{DefaultOnRequest, DefaultOnResponse},
};
use tracing::Level;
use uuid::Uuid;

use super::handler::{self, SupplyHandler};

pub fn router(handler: SupplyHandler) -> axum::Router {
    axum::Router::new()
        .merge(supply_router(handler))
        .layer(CatchPanicLayer::new())
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(|req: &Request| {
                    let request_id = Uuid::new_v4();
                    let path = if let Some(path) = req.extensions().get::<MatchedPath>() {
                        path.as_str()
                    } else {
                        req.uri().path()
                    };

                    tracing::info_span!(
                        "http-request", request_id = format!("{}", request_id), method = %req.method(), %path
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(tower_http::LatencyUnit::Micros),
                ),
        )
}

pub fn supply_router(handler: SupplyHandler) -> axum::Router {
    axum::Router::new()
        .route("/", get(handler::supply::supply))
        .route("/supply/summary", get(handler::supply::supply))
        .with_state(handler)
}
