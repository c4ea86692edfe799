//! ServiceFleet operator entry point.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use fleet_operator::config::{Cli, OperatorConfig};
use fleet_operator::{controller, metrics, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(&cli.log_level);

    let config = OperatorConfig::try_from(&cli).context("invalid configuration")?;

    info!("ServiceFleet operator");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let client = kube::Client::try_default()
        .await
        .context("failed to create Kubernetes client")?;

    let metrics_addr = config.metrics_addr.clone();
    tokio::spawn(async move {
        if let Err(e) = metrics::serve(metrics_addr).await {
            error!("Metrics server error: {e}");
        }
    });

    controller::run(client, config).await;
    Ok(())
}
