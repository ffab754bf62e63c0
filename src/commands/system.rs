use std::sync::Arc;

use super::{run_operator_loop, AppContext};
use crate::services::feed_service::ViewLayout;
use crate::services::scheduler::{DataKind, Scheduler};
use crate::utils::errors::AppError;

pub async fn execute(ctx: &AppContext) -> Result<(), AppError> {
    let feed = Arc::new(ctx.feed(ViewLayout::system()));
    let sample = ctx.config.metrics_sample;

    if ctx.once {
        feed.refresh_status().await.ok();
        feed.refresh_metrics(sample).await.ok();
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
    scheduler.schedule(DataKind::ClassMetrics, intervals.class_metrics, move || {
        let f = f.clone();
        async move {
            f.refresh_metrics(sample).await.ok();
        }
    });

    let f = feed.clone();
    scheduler.schedule(DataKind::HourlyVolume, intervals.hourly_volume, move || {
        let f = f.clone();
        async move {
            f.refresh_volume().await.ok();
        }
    });

    run_operator_loop(scheduler).await
}
