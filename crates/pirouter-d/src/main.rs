//! pirouter control panel daemon - entry point.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use pirouter_monitor::StatusAggregator;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Control panel daemon for the pirouter access point
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via PIROUTER_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    pirouter_d::logging::init_logging();

    info!("Starting pirouter-d v{}", env!("CARGO_PKG_VERSION"));

    // Config path: CLI arg > PIROUTER_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("PIROUTER_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = pirouter_d::AppConfig::from_file_or_default(&config_path)?;
    info!(
        wan_iface = %config.probes.wan_iface,
        ap_iface = %config.probes.ap_iface,
        port = config.dashboard.port,
        "Configuration loaded"
    );

    let aggregator = Arc::new(StatusAggregator::new(
        config.probes.clone(),
        Duration::from_secs(config.monitor.cache_ttl_secs),
    ));

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("shutdown signal received"),
            Err(e) => error!(error = %e, "failed to listen for shutdown signal"),
        }
        signal_token.cancel();
    });

    pirouter_dashboard::run_server(aggregator, config.dashboard.clone(), shutdown)
        .await
        .map_err(|e| pirouter_d::AppError::Server(e.to_string()))?;

    info!("pirouter-d stopped");
    Ok(())
}
