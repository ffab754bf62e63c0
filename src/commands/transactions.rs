use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{AppContext, OperatorInput, TransactionsArgs};
use crate::api::NetworkFailure;
use crate::models::{PaginationState, TransactionFilters, TransactionQuery};
use crate::services::feed_service::{Feed, ViewLayout};
use crate::services::scheduler::{DataKind, Scheduler};
use crate::utils::errors::AppError;

const USAGE: &str = "n, p, <page>, r, l <limit>, f key=value.. | f clear, d <id>, q";

/// Operator input read from stdin while browsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Next,
    Previous,
    Page(u32),
    Refresh,
    Limit(u32),
    Filter(TransactionFilters),
    Detail(String),
    Quit,
}

pub fn parse_input(line: &str) -> Result<Input, String> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match (head, rest) {
        ("", _) => Err("empty command".to_string()),
        ("n", "") => Ok(Input::Next),
        ("p", "") => Ok(Input::Previous),
        ("r", "") => Ok(Input::Refresh),
        ("q", "") => Ok(Input::Quit),
        ("l", limit) => match limit.parse::<u32>() {
            Ok(n) if n > 0 => Ok(Input::Limit(n)),
            _ => Err(format!("invalid limit '{}'", limit)),
        },
        ("f", "") => Err("f needs key=value pairs or 'clear'".to_string()),
        ("f", "clear") => Ok(Input::Filter(TransactionFilters::default())),
        ("f", pairs) => TransactionFilters::parse(pairs).map(Input::Filter),
        ("d", id) if !id.is_empty() && !id.contains(char::is_whitespace) => {
            Ok(Input::Detail(id.to_string()))
        }
        (page, "") => match page.parse::<u32>() {
            Ok(n) if n > 0 => Ok(Input::Page(n)),
            _ => Err(format!("unknown command '{}'", line)),
        },
        _ => Err(format!("unknown command '{}'", line)),
    }
}

/// Query and paging state of the transactions view.
///
/// The query is what the operator asked for; the pagination is what the last
/// arriving response says is on screen. Navigation works from the latter.
pub struct TransactionBrowser {
    feed: Arc<Feed>,
    query: Mutex<TransactionQuery>,
    pagination: Mutex<Option<PaginationState>>,
}

impl TransactionBrowser {
    pub fn new(feed: Arc<Feed>, query: TransactionQuery) -> Self {
        Self {
            feed,
            query: Mutex::new(query),
            pagination: Mutex::new(None),
        }
    }

    pub async fn query(&self) -> TransactionQuery {
        self.query.lock().await.clone()
    }

    pub async fn pagination(&self) -> Option<PaginationState> {
        *self.pagination.lock().await
    }

    /// Fetch the current query and record the paging it came back with
    pub async fn refresh(&self) -> Result<(), NetworkFailure> {
        let query = self.query().await;
        let state = self.feed.refresh_transactions(&query).await?;

        *self.pagination.lock().await = Some(state);
        // The backend clamps out-of-range pages; follow it
        let mut current = self.query.lock().await;
        if *current == query && current.page != state.current_page {
            debug!("Page {} clamped to {}", current.page, state.current_page);
            current.page = state.current_page;
        }
        Ok(())
    }

    /// Jump to `page`, clamped to the known page count. Returns false when
    /// that page is already the one on screen.
    pub async fn go_to(&self, page: u32) -> Result<bool, NetworkFailure> {
        let shown = self.pagination().await;
        let target = match shown {
            Some(state) => page.clamp(1, state.total_pages),
            None => page.max(1),
        };
        if shown.map(|state| state.current_page) == Some(target) {
            return Ok(false);
        }

        self.query.lock().await.page = target;
        self.refresh().await?;
        Ok(true)
    }

    pub async fn next(&self) -> Result<bool, NetworkFailure> {
        match self.pagination().await {
            Some(state) if state.is_last() => Ok(false),
            Some(state) => self.go_to(state.current_page + 1).await,
            None => Ok(false),
        }
    }

    pub async fn previous(&self) -> Result<bool, NetworkFailure> {
        match self.pagination().await {
            Some(state) if state.is_first() => Ok(false),
            Some(state) => self.go_to(state.current_page - 1).await,
            None => Ok(false),
        }
    }

    /// New page size, back to page 1
    pub async fn set_limit(&self, limit: u32) -> Result<(), NetworkFailure> {
        {
            let mut query = self.query.lock().await;
            query.limit = limit.max(1);
            query.page = 1;
        }
        self.refresh().await
    }

    /// New filter set replacing the old one, back to page 1
    pub async fn set_filters(&self, filters: TransactionFilters) -> Result<(), NetworkFailure> {
        self.query.lock().await.set_filters(filters);
        self.refresh().await
    }
}

fn initial_query(ctx: &AppContext, args: TransactionsArgs) -> TransactionQuery {
    let mut query = TransactionQuery::new(args.limit.unwrap_or(ctx.config.page_size).max(1));
    query.set_filters(TransactionFilters {
        mti: args.mti,
        response: args.response,
        date: args.date,
        search: args.search,
    });
    query.with_page(args.page)
}

/// Act on one operator input. Ok(false) means the control was disabled.
/// Manual refresh goes through the scheduler like any other tick.
async fn apply_input(
    input: Input,
    browser: &TransactionBrowser,
    feed: &Feed,
    scheduler: &Scheduler,
) -> Result<bool, NetworkFailure> {
    match input {
        Input::Next => browser.next().await,
        Input::Previous => browser.previous().await,
        Input::Page(page) => browser.go_to(page).await,
        Input::Refresh => Ok(scheduler.trigger(DataKind::Transactions)),
        Input::Limit(limit) => browser.set_limit(limit).await.map(|_| true),
        Input::Filter(filters) => browser.set_filters(filters).await.map(|_| true),
        Input::Detail(id) => feed.show_detail(&id).await.map(|_| true),
        Input::Quit => Ok(false),
    }
}

pub async fn execute(ctx: &AppContext, args: TransactionsArgs) -> Result<(), AppError> {
    let feed = Arc::new(ctx.feed(ViewLayout::transactions()));
    let browser = Arc::new(TransactionBrowser::new(feed.clone(), initial_query(ctx, args)));

    if ctx.once {
        feed.refresh_status().await.ok();
        browser.refresh().await.ok();
        return Ok(());
    }

    let intervals = &ctx.config.intervals;
    let mut scheduler = Scheduler::new();

    let f = feed.clone();
    scheduler.schedule(DataKind::Status, intervals.status, move || {
        let f = f.clone();
        async move {
            f.refresh_status().await.ok();
        }
    });

    let b = browser.clone();
    scheduler.schedule(DataKind::Transactions, intervals.transactions, move || {
        let b = b.clone();
        async move {
            b.refresh().await.ok();
        }
    });

    let mut input = OperatorInput::stdin();
    while let Some(line) = input.next_line().await? {
        let command = match parse_input(&line) {
            Ok(Input::Quit) => break,
            Ok(command) => command,
            Err(e) => {
                warn!("{} ({})", e, USAGE);
                continue;
            }
        };
        debug!("Input {:?}", command);

        // Errors are rendered by the feed; the loop keeps going
        if let Ok(false) = apply_input(command, &browser, &feed, &scheduler).await {
            info!("Nothing to do");
        }
    }

    scheduler.stop();
    Ok(())
}
