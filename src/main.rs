//! icmpcheck Binary Entry Point
//!
//! Runs the receiver with the production ICMP prober and logs every metric
//! batch. Core functionality is provided by the `icmpcheck` library crate.

use clap::Parser;
use icmpcheck::{
    DEFAULT_SHUTDOWN_TIMEOUT, IcmpCheckReceiver, IcmpProber, LogConsumer, ReceiverConfig,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// icmpcheck - ICMP Reachability Receiver
#[derive(Parser, Debug)]
#[command(name = "icmpcheck", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "configs/icmpcheck.yaml",
        env = "ICMPCHECK_CONFIG"
    )]
    config: String,

    /// Sweep interval (overrides config file), e.g. "30s"
    #[arg(long, env = "ICMPCHECK_INTERVAL", value_parser = icmpcheck::config::parse_interval)]
    interval: Option<std::time::Duration>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,icmpcheck=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("icmpcheck - ICMP Reachability Receiver");

    let cli = Cli::parse();

    tracing::info!(path = %cli.config, "Loading configuration");
    let mut config = ReceiverConfig::load(&cli.config)?;

    // CLI > ENV > config file
    if let Some(interval) = cli.interval {
        config.interval = interval;
    }

    tracing::info!(
        interval = ?config.interval,
        targets = config.targets.len(),
        "Configuration loaded"
    );

    let mut receiver = IcmpCheckReceiver::new(config, IcmpProber::new(), LogConsumer)?;

    let root = CancellationToken::new();
    receiver.start(&root)?;

    tracing::info!("Press Ctrl+C to shutdown");
    shutdown_signal().await;

    root.cancel();
    receiver
        .shutdown_with_timeout(DEFAULT_SHUTDOWN_TIMEOUT)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }
}
