use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod commands;
mod config;
mod models;
mod services;
mod utils;

use api::PortalClient;
use commands::{AppContext, Command};
use config::Config;
use services::chart_service::ChartRegistry;
use utils::errors::{clean_error, AppError};
use utils::surface::Surface;

/// Live monitor for the Postilion switch portal
#[derive(Debug, Parser)]
#[command(name = "postilion-dash", version, about)]
struct Cli {
    /// Run every cycle of the view once and exit
    #[arg(long, global = true)]
    once: bool,
    /// Mirror regions and charts into this directory
    #[arg(long, global = true, value_name = "DIR")]
    out: Option<PathBuf>,
    /// Print every region update to stdout
    #[arg(long, global = true)]
    echo: bool,
    /// Portal base URL (overrides DASH_BASE_URL)
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    // Logs go to stderr, stdout carries the echoed regions
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("postilion_dash=info,reqwest=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting postilion-dash v{}", env!("CARGO_PKG_VERSION"));

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", clean_error(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let mut config = Config::from_env()?;
    if let Some(url) = cli.base_url {
        config.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(dir) = cli.out {
        config.output_dir = Some(dir);
    }

    if let Some(dir) = &config.output_dir {
        tokio::fs::create_dir_all(dir).await?;
        info!("Writing regions and charts to {}", dir.display());
    }

    // Without an output directory the terminal is the only display
    let echo = cli.echo || config.output_dir.is_none();
    let api = PortalClient::new(config.base_url.clone(), config.request_timeout)?;
    info!("Polling {}", api.base_url());

    let ctx = AppContext {
        surface: Arc::new(Surface::with_output(config.output_dir.clone(), echo)),
        charts: Arc::new(ChartRegistry::new(config.output_dir.clone())),
        api: Arc::new(api),
        once: cli.once,
        config,
    };

    commands::execute(&ctx, cli.command).await
}
