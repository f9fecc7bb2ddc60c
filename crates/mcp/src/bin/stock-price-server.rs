// Standalone MCP stock price server binary

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use stockwatch_core::{Logging, StockwatchConfig};
use stockwatch_mcp::tools::stock_registry;
use stockwatch_mcp::{MarketClient, McpServer};
use tracing::Instrument;

#[derive(Parser, Debug)]
#[command(name = "stock-price-server")]
#[command(about = "MCP server exposing stock price tools over stdio", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "stockwatch.toml", env = "STOCKWATCH_CONFIG")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = StockwatchConfig::load(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;

    // stdout carries the protocol, so logs stay on stderr or in the log file.
    let span = Logging::new(config.logging.clone())
        .install()
        .context("Failed to initialise logging")?;

    run(config).instrument(span).await
}

async fn run(config: StockwatchConfig) -> Result<()> {
    tracing::info!("Stock Price Server starting...");

    let market = Arc::new(MarketClient::new(&config.market).context("Failed to set up market client")?);
    let registry = stock_registry(market);
    tracing::info!("Registered {} tools", registry.len());

    McpServer::new(registry).start().await
}
