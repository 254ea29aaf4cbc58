//! sigex-bot - entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Webhook-driven Bybit order execution service
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via SIGEX_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logging level may come from the file, so read it before logging starts.
    let (config, source) = sigex_bot::AppConfig::load(args.config)?;
    sigex_telemetry::init_logging(config.telemetry.log_level.as_deref())?;
    source.log();

    info!("Starting sigex-bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        testnet = config.exchange.testnet,
        listen = %config.webhook.bind_addr(),
        "Configuration loaded"
    );

    let app = sigex_bot::Application::new(config)?;
    app.run().await?;

    Ok(())
}
