use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use stockwatch_audit::Auditor;
use stockwatch_core::{Logging, StockwatchConfig};
use tracing::Instrument;

#[derive(Parser, Debug)]
#[command(name = "dependency-audit")]
#[command(about = "Audit uv-locked Python dependencies for vulnerabilities and updates", long_about = None)]
struct Args {
    /// Project root containing uv.lock, pyproject.toml and Dockerfile
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Path to configuration file (relative paths resolve against the root)
    #[arg(short, long, default_value = "stockwatch.toml", env = "STOCKWATCH_CONFIG")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.root.join(&args.config);
    let config = StockwatchConfig::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;

    let span = Logging::new(config.logging.clone())
        .install()
        .context("Failed to initialise logging")?;

    run(args, config).instrument(span).await
}

async fn run(args: Args, config: StockwatchConfig) -> Result<()> {
    tracing::info!(root = %args.root.display(), "Starting dependency audit");

    let auditor = Auditor::new(&args.root, config.audit).context("Failed to set up API clients")?;
    let today = chrono::Local::now().date_naive();
    let outcome = auditor.run(today).await?;

    let name = outcome
        .report_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    println!("Wrote {}", name);

    Ok(())
}
