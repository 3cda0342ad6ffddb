use std::{path::PathBuf, time::Duration};

use argh::FromArgs;
use supply::{app::App, config::app_config};
use tracing::{info, trace};
use tracing_subscriber::EnvFilter;

#[derive(FromArgs)]
/// Serves total, circulating and bonded supply of a Cosmos SDK chain.
struct Args {
    /// directory holding `base.json` and `<environment>.json`
    #[argh(option, default = "PathBuf::from(\"config\")")]
    config_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args: Args = argh::from_env();
    let config = app_config(&args.config_dir)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.application.trace_level))?;

    tracing_subscriber::fmt()
        .with_file(true)
        .with_line_number(true)
        .with_env_filter(filter)
        .compact()
        .init();

    trace!("logging enabled");
    info!(default_denom = %config.chain.default_denom, "loaded configuration");

    let app = App::new(config)?;
    let services = app.services();

    info!("starting services");
    services
        .catch_signals()
        .handle_shutdown_requests(Duration::from_millis(1000))
        .await
        .map_err(Into::into)
}
