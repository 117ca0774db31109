use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use webhook_sink::{logging, metrics, server, AppState, Config, PayloadPolicy};

#[derive(Parser)]
#[command(name = "webhook_sink")]
#[command(about = "Records inbound webhook payloads in memory for inspection")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (defaults to ./config.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// How to handle bodies that are not JSON
    #[arg(long, value_enum)]
    policy: Option<PayloadPolicy>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let _log_guard = logging::init_logging();

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_overrides(cli.host, cli.port, cli.policy);
    info!(?config, "Configuration loaded");

    let state = AppState::from_config(&config).with_metrics(metrics::init_metrics());

    server::start_server(state, &config).await?;

    info!("Server stopped");
    Ok(())
}
