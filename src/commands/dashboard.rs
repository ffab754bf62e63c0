use std::sync::Arc;

use super::{run_operator_loop, AppContext};
use crate::models::TransactionQuery;
use crate::services::feed_service::ViewLayout;
use crate::services::scheduler::{DataKind, Scheduler};
use crate::utils::errors::AppError;

pub async fn execute(ctx: &AppContext) -> Result<(), AppError> {
    let feed = Arc::new(ctx.feed(ViewLayout::dashboard()));
    let recent = TransactionQuery::new(ctx.config.recent_limit);

    // Failures are already rendered into their regions
    if ctx.once {
        feed.refresh_status().await.ok();
        feed.refresh_transactions(&recent).await.ok();
        feed.refresh_volume().await.ok();
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

    let f = feed.clone();
    scheduler.schedule(
        DataKind::RecentTransactions,
        intervals.recent_transactions,
        move || {
            let (f, query) = (f.clone(), recent.clone());
            async move {
                f.refresh_transactions(&query).await.ok();
            }
        },
    );

    let f = feed.clone();
    scheduler.schedule(DataKind::Stats, intervals.stats, move || {
        let f = f.clone();
        async move {
            f.refresh_volume().await.ok();
        }
    });

    run_operator_loop(scheduler).await
}
