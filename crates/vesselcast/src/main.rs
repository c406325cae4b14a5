//! Vesselcast - AIS to NMEA-0183 bridge
//!
//! # Usage
//!
//! ```bash
//! # Run the bridge
//! vesselcast
//! vesselcast --config configs/vesselcast.toml
//!
//! # Raise log verbosity without touching the config
//! vesselcast --log-level debug
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vesselcast_config::Config;
use vesselcast_pipeline::Controller;

/// Vesselcast - AIS to NMEA-0183 bridge
#[derive(Parser, Debug)]
#[command(name = "vesselcast")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "configs/vesselcast.toml")]
    config: std::path::PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_file(&cli.config)
        .with_context(|| format!("invalid configuration '{}'", cli.config.display()))?;

    let level = cli
        .log_level
        .as_deref()
        .unwrap_or(&config.logging.level)
        .to_string();
    init_logging(&level)?;

    tracing::info!(
        config = %cli.config.display(),
        upstream = %config.stream_url,
        stream_enabled = config.network.enable_stream,
        datagram_enabled = config.network.enable_datagram,
        "vesselcast starting"
    );

    let controller = Arc::new(Controller::new(config));
    let cancel = CancellationToken::new();

    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            signal_cancel.cancel();
        }
    });

    controller.run(cancel).await;

    tracing::info!("vesselcast stopped");
    Ok(())
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();

    Ok(())
}
