use std::sync::Arc;

use anyhow::{Context, Result};
use supplylib::{LcdStatusProvider, StatusProvider};
use tokio_graceful_shutdown::{IntoSubsystem, SubsystemBuilder, Toplevel};
use tracing::debug;

use crate::{
    config::Config,
    http::{HttpService, SupplyHandler},
};

pub struct App {
    provider: Arc<dyn StatusProvider>,
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let provider = LcdStatusProvider::try_from(&config.chain).with_context(|| {
            format!("Could not make status provider for {}", config.chain.lcd_url)
        })?;
        debug!(lcd_url = %config.chain.lcd_url, "status provider ready");

        Ok(Self::with_provider(config, Arc::new(provider)))
    }

    pub fn with_provider(config: Config, provider: Arc<dyn StatusProvider>) -> Self {
        Self { provider, config }
    }

    pub fn handler(&self) -> SupplyHandler {
        SupplyHandler::new(
            self.config.chain.default_denom.as_str(),
            Arc::clone(&self.provider),
        )
        .with_timeout(self.config.http.request_timeout())
    }

    pub fn services(self) -> Toplevel {
        let http_service = HttpService {
            handler: self.handler(),
            config: self.config.http,
        };

        Toplevel::new(|s| async move {
            s.start(SubsystemBuilder::new(
                "HttpService",
                http_service.into_subsystem(),
            ));
        })
    }
}
