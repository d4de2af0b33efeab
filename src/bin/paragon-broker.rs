use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use paragon_broker::server;
use paragon_broker::utils::config_loader;
use paragon_broker::utils::logging;
use paragon_broker::utils::logging::LogLevel;
use reqwest::Client;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML config file; built-in defaults when omitted
    #[arg(short, long, env = "CONFIG")]
    config: Option<String>,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // -------------------------------
    // 1. Load YAML config, init logging
    // -------------------------------

    let service_config = config_loader::run(args.config.as_deref())?;
    logging::run(&service_config, args.log_level);

    // -------------------------------
    // 2. Create request client, shared by every request
    // -------------------------------

    let client = Client::builder()
        .timeout(Duration::from_millis(service_config.upstream.timeout_ms))
        .build()
        .context("building http client")?;

    // -------------------------------
    // 3. Serve
    // -------------------------------

    info!(upstream = %service_config.upstream.base_url, "Service starting...");
    server::server::start(&service_config, client).await
}
