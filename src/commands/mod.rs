pub mod dashboard;
pub mod detail;
pub mod system;
pub mod transactions;

use clap::{Args, Subcommand};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};

use crate::api::PortalApi;
use crate::config::Config;
use crate::services::chart_service::ChartRegistry;
use crate::services::feed_service::{Feed, ViewLayout};
use crate::services::scheduler::{DataKind, Scheduler};
use crate::utils::errors::AppError;
use crate::utils::surface::Surface;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Status, recent transactions and today's volume chart
    Dashboard,
    /// Paged transaction browser
    Transactions(TransactionsArgs),
    /// Status, message class metrics and hourly volume
    System,
    /// Show a single transaction
    Detail {
        /// Transaction id
        id: String,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct TransactionsArgs {
    /// Page to open
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    /// Rows per page (defaults to DASH_PAGE_SIZE)
    #[arg(long)]
    pub limit: Option<u32>,
    /// Message type indicator, e.g. 0200
    #[arg(long)]
    pub mti: Option<String>,
    /// Response code, e.g. 00
    #[arg(long)]
    pub response: Option<String>,
    /// Transaction date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,
    /// Free-text search
    #[arg(long)]
    pub search: Option<String>,
}

/// Everything a view needs, shared by all of its cycles
pub struct AppContext {
    pub config: Config,
    pub api: Arc<dyn PortalApi>,
    pub surface: Arc<Surface>,
    pub charts: Arc<ChartRegistry>,
    /// Run each cycle once and exit instead of polling
    pub once: bool,
}

impl AppContext {
    pub fn feed(&self, layout: ViewLayout) -> Feed {
        Feed::new(self.api.clone(), self.surface.clone(), self.charts.clone(), layout)
            .with_max_page_links(self.config.max_page_links)
    }
}

pub async fn execute(ctx: &AppContext, command: Command) -> Result<(), AppError> {
    match command {
        Command::Dashboard => dashboard::execute(ctx).await,
        Command::Transactions(args) => transactions::execute(ctx, args).await,
        Command::System => system::execute(ctx).await,
        Command::Detail { id } => detail::execute(ctx, &id).await,
    }
}

/// Lines typed by the operator while a view is polling
pub(crate) struct OperatorInput {
    lines: Lines<BufReader<Stdin>>,
}

impl OperatorInput {
    pub fn stdin() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Next non-blank line, or `None` on ctrl-c. A closed stdin leaves the
    /// view polling until ctrl-c.
    pub async fn next_line(&mut self) -> Result<Option<String>, AppError> {
        loop {
            let line = tokio::select! {
                line = self.lines.next_line() => line?,
                signal = tokio::signal::ctrl_c() => {
                    signal?;
                    info!("Shutting down");
                    return Ok(None);
                }
            };

            match line {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => return Ok(Some(line)),
                None => {
                    info!("Input closed, polling until ctrl-c");
                    return wait_for_shutdown().await.map(|_| None);
                }
            }
        }
    }
}

/// Commands shared by the polling views
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewInput {
    /// `r` refreshes everything the view polls, `r <kind>` one kind
    Refresh(Option<DataKind>),
    Quit,
}

pub fn parse_view_input(line: &str) -> Result<ViewInput, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        ["r"] => Ok(ViewInput::Refresh(None)),
        ["r", kind] => DataKind::from_name(kind)
            .map(|kind| ViewInput::Refresh(Some(kind)))
            .ok_or_else(|| format!("unknown data kind '{}'", kind)),
        ["q"] => Ok(ViewInput::Quit),
        _ => Err(format!("unknown command '{}'", line.trim())),
    }
}

/// Read `r [kind]` / `q` until the operator quits, then stop the timers
pub(crate) async fn run_operator_loop(mut scheduler: Scheduler) -> Result<(), AppError> {
    let mut input = OperatorInput::stdin();

    while let Some(line) = input.next_line().await? {
        match parse_view_input(&line) {
            Ok(ViewInput::Quit) => break,
            Ok(ViewInput::Refresh(None)) => {
                let fired = scheduler.trigger_all();
                info!("Refreshing {} data kinds", fired);
            }
            Ok(ViewInput::Refresh(Some(kind))) => {
                if !scheduler.trigger(kind) {
                    warn!("{} is not polled in this view", kind.name());
                }
            }
            Err(e) => warn!("{} (r [kind], q)", e),
        }
    }

    scheduler.stop();
    Ok(())
}

/// Block until the operator hits ctrl-c
pub(crate) async fn wait_for_shutdown() -> Result<(), AppError> {
    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    Ok(())
}
