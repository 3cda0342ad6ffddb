mod handler;
mod routing;

use std::net::SocketAddr;

use anyhow::Result;
use axum::async_trait;
use tokio::net::TcpListener;
use tokio_graceful_shutdown::{IntoSubsystem, SubsystemHandle};
use tracing::info;

use crate::config::HttpConfig;

pub use self::handler::{SupplyError, SupplyHandler, SupplyQuery};
pub use self::routing::router;

pub struct HttpService {
    pub handler: SupplyHandler,
    pub config: HttpConfig,
}

#[async_trait]
impl IntoSubsystem<anyhow::Error> for HttpService {
    async fn run(self, subsys: SubsystemHandle) -> Result<()> {
        let router = router(self.handler);

        let socket = SocketAddr::new(self.config.host, self.config.port);
        let listener = TcpListener::bind(&socket).await?;
        let graceful_shutdown = |h: SubsystemHandle| async move { h.on_shutdown_requested().await };

        info!("running server on {}", listener.local_addr()?);

        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(graceful_shutdown(subsys))
            .await?;

        Ok(())
    }
}
