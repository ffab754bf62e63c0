//! Fetch-and-render cycles.
//!
//! Each cycle issues one request and, once it settles, replaces its target
//! region(s) in a single swap. Responses are applied in arrival order, so when
//! two cycles of the same kind overlap the one that lands last wins.

use chrono::Local;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::{NetworkFailure, PortalApi};
use crate::models::{Connectivity, HourlyVolume, PaginationState, TransactionQuery};
use crate::services::chart_service::{Canvas, ChartRegistry};
use crate::services::decoder::{decode_taxonomy, tally_classes};
use crate::services::pagination_service::{compute_window, DEFAULT_MAX_VISIBLE};
use crate::services::render_service::{
    render_badge, render_class_tally, render_detail, render_error, render_pagination,
    render_status, render_transactions,
};
use crate::utils::surface::{Region, Surface};

/// Where each kind of data lands in a view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewLayout {
    pub status: Option<Region>,
    pub transactions: Region,
    pub pagination: Option<Region>,
    pub metrics: Option<Region>,
    pub chart: Canvas,
}

impl ViewLayout {
    pub fn dashboard() -> Self {
        Self {
            status: Some(Region::SystemStatus),
            transactions: Region::RecentTransactions,
            pagination: None,
            metrics: None,
            chart: Canvas::TransactionChart,
        }
    }

    pub fn transactions() -> Self {
        Self {
            status: None,
            transactions: Region::Transactions,
            pagination: Some(Region::Pagination),
            metrics: None,
            chart: Canvas::TransactionChart,
        }
    }

    pub fn system() -> Self {
        Self {
            status: Some(Region::SystemStatus),
            transactions: Region::RecentTransactions,
            pagination: None,
            metrics: Some(Region::TransactionMetrics),
            chart: Canvas::HourlyTransactionChart,
        }
    }
}

pub struct Feed {
    api: Arc<dyn PortalApi>,
    surface: Arc<Surface>,
    charts: Arc<ChartRegistry>,
    layout: ViewLayout,
    max_page_links: u32,
}

impl Feed {
    pub fn new(
        api: Arc<dyn PortalApi>,
        surface: Arc<Surface>,
        charts: Arc<ChartRegistry>,
        layout: ViewLayout,
    ) -> Self {
        Self {
            api,
            surface,
            charts,
            layout,
            max_page_links: DEFAULT_MAX_VISIBLE,
        }
    }

    pub fn with_max_page_links(mut self, max_page_links: u32) -> Self {
        self.max_page_links = max_page_links;
        self
    }

    /// Badge and status panel. A failed poll flips the badge to Offline and
    /// leaves every other region alone.
    pub async fn refresh_status(&self) -> Result<(), NetworkFailure> {
        match self.api.status().await {
            Ok(snapshot) => {
                debug!("Status {} received", snapshot.status.as_str());
                let mut updates = vec![(
                    Region::StatusBadge,
                    render_badge(Connectivity::from(snapshot.status)),
                )];
                if let Some(region) = self.layout.status {
                    updates.push((region, render_status(&snapshot, Local::now().naive_local())));
                }
                self.surface.replace_all(updates).await;
                Ok(())
            }
            Err(failure) => {
                warn!("Status poll failed: {}", failure);
                let mut updates = vec![(Region::StatusBadge, render_badge(Connectivity::Offline))];
                if let Some(region) = self.layout.status {
                    updates.push((region, render_error("system status", &failure)));
                }
                self.surface.replace_all(updates).await;
                Err(failure)
            }
        }
    }

    /// Transactions table plus its pagination bar, swapped together
    pub async fn refresh_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<PaginationState, NetworkFailure> {
        match self.api.transactions(query).await {
            Ok(feed) => {
                debug!(
                    "{} transactions received for page {}",
                    feed.records.len(),
                    query.page
                );
                let mut updates = vec![(self.layout.transactions, render_transactions(&feed.records))];
                if let Some(region) = self.layout.pagination {
                    let window = compute_window(
                        feed.pagination.current_page,
                        feed.pagination.total_pages,
                        self.max_page_links,
                    );
                    updates.push((region, render_pagination(&window, &feed.pagination)));
                }
                self.surface.replace_all(updates).await;
                Ok(feed.pagination)
            }
            Err(failure) => {
                warn!("Transactions poll failed: {}", failure);
                self.surface
                    .replace(self.layout.transactions, render_error("transactions", &failure))
                    .await;
                Err(failure)
            }
        }
    }

    /// Hourly volume chart. On failure the chart keeps its last series.
    pub async fn refresh_volume(&self) -> Result<(), NetworkFailure> {
        let volume = match self.api.hourly_stats().await {
            Ok(volume) => volume,
            Err(failure) => {
                warn!("Stats poll failed: {}", failure);
                return Err(failure);
            }
        };

        debug!("{} transactions in hourly stats", volume.total());
        match self
            .charts
            .upsert(self.layout.chart, HourlyVolume::labels(), volume.values())
            .await
        {
            Ok(update) => debug!("Chart {} {:?}", self.layout.chart.id(), update),
            Err(e) => warn!("Chart {} not drawn: {}", self.layout.chart.id(), e),
        }
        Ok(())
    }

    /// Message class breakdown over the latest `sample` transactions
    pub async fn refresh_metrics(&self, sample: u32) -> Result<(), NetworkFailure> {
        let Some(region) = self.layout.metrics else {
            return Ok(());
        };

        match self.api.transactions(&TransactionQuery::new(sample)).await {
            Ok(feed) => {
                let tally = tally_classes(&feed.records);
                self.surface.replace(region, render_class_tally(&tally)).await;
                Ok(())
            }
            Err(failure) => {
                warn!("Metrics poll failed: {}", failure);
                self.surface
                    .replace(region, render_error("transaction metrics", &failure))
                    .await;
                Err(failure)
            }
        }
    }

    /// Fetch one transaction into the detail region
    pub async fn show_detail(&self, id: &str) -> Result<(), NetworkFailure> {
        info!("Loading transaction {}", id);
        self.surface
            .replace(Region::TransactionDetail, "Loading transaction details...\n".to_string())
            .await;

        match self.api.transaction(id).await {
            Ok(record) => {
                debug!("Transaction {} is a {}", id, decode_taxonomy(record.mti.as_deref()));
                self.surface
                    .replace(Region::TransactionDetail, render_detail(&record))
                    .await;
                Ok(())
            }
            Err(failure) => {
                warn!("Transaction {} not loaded: {}", id, failure);
                self.surface
                    .replace(
                        Region::TransactionDetail,
                        render_error("transaction details", &failure),
                    )
                    .await;
                Err(failure)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::portal::fake::FakePortal;
    use crate::models::{StatusSnapshot, SystemState, TransactionFeed, TransactionRecord};
    use std::time::Duration;
    use tokio::time::sleep;

    fn record(id: &str, mti: &str) -> TransactionRecord {
        TransactionRecord {
            id: Some(id.to_string()),
            mti: Some(mti.to_string()),
            amount: Some("1000".to_string()),
            response_code: Some("00".to_string()),
            terminal_id: Some("TERM0001".to_string()),
            ..Default::default()
        }
    }

    fn feed_of(ids: &[&str], total_pages: u32) -> TransactionFeed {
        TransactionFeed {
            records: ids.iter().map(|id| record(id, "0200")).collect(),
            pagination: PaginationState::from_response(1, Some(total_pages), 50),
        }
    }

    fn volume(hours: &[(&str, u64)]) -> HourlyVolume {
        let stats = hours
            .iter()
            .map(|(hour, count)| (hour.to_string(), serde_json::json!(count)))
            .collect();
        HourlyVolume::from_stats(&stats)
    }

    fn running() -> StatusSnapshot {
        StatusSnapshot {
            status: SystemState::Running,
            start_time: Some("2024-03-01T08:00:00".to_string()),
            transactions_processed: 42,
            ..Default::default()
        }
    }

    fn feed_with(
        portal: &Arc<FakePortal>,
        layout: ViewLayout,
    ) -> (Arc<Feed>, Arc<Surface>, Arc<ChartRegistry>) {
        let surface = Arc::new(Surface::new());
        let charts = Arc::new(ChartRegistry::new(None));
        let feed = Feed::new(portal.clone(), surface.clone(), charts.clone(), layout);
        (Arc::new(feed), surface, charts)
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_arrival_wins_over_issue_order() {
        let portal = Arc::new(FakePortal::new());
        let first = feed_of(&["A1", "A2"], 2);
        let second = feed_of(&["B1"], 1);
        portal.push_transactions(Duration::from_millis(200), Ok(first.clone()));
        portal.push_transactions(Duration::from_millis(50), Ok(second.clone()));

        let (feed, surface, _) = feed_with(&portal, ViewLayout::transactions());
        let query = TransactionQuery::new(50);

        let (f, q) = (feed.clone(), query.clone());
        let slow = tokio::spawn(async move { f.refresh_transactions(&q).await });
        sleep(Duration::from_millis(10)).await;
        let (f, q) = (feed.clone(), query.clone());
        let fast = tokio::spawn(async move { f.refresh_transactions(&q).await });

        sleep(Duration::from_millis(60)).await;
        assert_eq!(
            surface.content(Region::Transactions).await,
            Some(render_transactions(&second.records))
        );

        assert!(fast.await.unwrap().is_ok());
        assert_eq!(slow.await.unwrap().unwrap(), first.pagination);
        assert_eq!(
            surface.content(Region::Transactions).await,
            Some(render_transactions(&first.records))
        );
        let window = compute_window(1, 2, DEFAULT_MAX_VISIBLE);
        assert_eq!(
            surface.content(Region::Pagination).await,
            Some(render_pagination(&window, &first.pagination))
        );
    }

    #[tokio::test]
    async fn test_status_failure_only_touches_status_regions() {
        let portal = Arc::new(FakePortal::new());
        portal.push_transactions(Duration::ZERO, Ok(feed_of(&["T1"], 1)));
        portal.push_status(Duration::ZERO, Ok(running()));
        portal.push_status(
            Duration::ZERO,
            Err(NetworkFailure::Request("connection refused".to_string())),
        );

        let (feed, surface, _) = feed_with(&portal, ViewLayout::dashboard());
        feed.refresh_transactions(&TransactionQuery::new(5)).await.unwrap();
        let table = surface.content(Region::RecentTransactions).await;

        feed.refresh_status().await.unwrap();
        assert_eq!(surface.content(Region::StatusBadge).await.as_deref(), Some("[ Online ]\n"));

        assert!(feed.refresh_status().await.is_err());
        assert_eq!(surface.content(Region::StatusBadge).await.as_deref(), Some("[ Offline ]\n"));
        let status = surface.content(Region::SystemStatus).await.unwrap();
        assert!(status.starts_with("! Failed to load system status"));
        assert_eq!(surface.content(Region::RecentTransactions).await, table);
    }

    #[tokio::test]
    async fn test_warning_status_shows_warning_badge() {
        let portal = Arc::new(FakePortal::new());
        portal.push_status(
            Duration::ZERO,
            Ok(StatusSnapshot {
                status: SystemState::Warning,
                ..Default::default()
            }),
        );

        let (feed, surface, _) = feed_with(&portal, ViewLayout::transactions());
        feed.refresh_status().await.unwrap();

        assert_eq!(surface.content(Region::StatusBadge).await.as_deref(), Some("[ Warning ]\n"));
        assert_eq!(surface.content(Region::SystemStatus).await, None);
    }

    #[tokio::test]
    async fn test_rerendering_same_data_is_idempotent() {
        let portal = Arc::new(FakePortal::new());
        portal.push_transactions(Duration::ZERO, Ok(feed_of(&["T1", "T2", "T3"], 1)));

        let (feed, surface, _) = feed_with(&portal, ViewLayout::transactions());
        let query = TransactionQuery::new(50);

        feed.refresh_transactions(&query).await.unwrap();
        let once = surface.content(Region::Transactions).await;
        feed.refresh_transactions(&query).await.unwrap();
        feed.refresh_transactions(&query).await.unwrap();

        assert_eq!(surface.content(Region::Transactions).await, once);
    }

    #[tokio::test]
    async fn test_transactions_failure_renders_inline_error() {
        let portal = Arc::new(FakePortal::new());
        portal.push_transactions(
            Duration::ZERO,
            Err(NetworkFailure::Status {
                code: 500,
                message: "database unavailable".to_string(),
            }),
        );

        let (feed, surface, _) = feed_with(&portal, ViewLayout::transactions());
        assert!(feed.refresh_transactions(&TransactionQuery::new(50)).await.is_err());

        let content = surface.content(Region::Transactions).await.unwrap();
        assert!(content.starts_with("! Failed to load transactions"));
        assert!(content.contains("database unavailable"));
        assert_eq!(surface.content(Region::Pagination).await, None);
    }

    #[tokio::test]
    async fn test_volume_chart_is_created_once_then_updated() {
        let portal = Arc::new(FakePortal::new());
        portal.push_stats(Duration::ZERO, Ok(volume(&[("2", 5)])));
        portal.push_stats(Duration::ZERO, Ok(volume(&[("10", 3)])));

        let (feed, _, charts) = feed_with(&portal, ViewLayout::system());
        feed.refresh_volume().await.unwrap();
        feed.refresh_volume().await.unwrap();

        assert_eq!(charts.len().await, 1);
        let (labels, values, revision) = charts.series(Canvas::HourlyTransactionChart).await.unwrap();
        assert_eq!(labels.len(), 24);
        assert_eq!(values[10], 3);
        assert_eq!(values[2], 0);
        assert_eq!(revision, 2);
    }

    #[tokio::test]
    async fn test_volume_failure_keeps_previous_chart() {
        let portal = Arc::new(FakePortal::new());
        portal.push_stats(Duration::ZERO, Ok(volume(&[("7", 9)])));
        portal.push_stats(Duration::ZERO, Err(NetworkFailure::Request("timed out".to_string())));

        let (feed, _, charts) = feed_with(&portal, ViewLayout::dashboard());
        feed.refresh_volume().await.unwrap();
        assert!(feed.refresh_volume().await.is_err());

        let (_, values, revision) = charts.series(Canvas::TransactionChart).await.unwrap();
        assert_eq!(values[7], 9);
        assert_eq!(revision, 1);
    }

    #[tokio::test]
    async fn test_metrics_use_sample_size() {
        let portal = Arc::new(FakePortal::new());
        portal.push_transactions(
            Duration::ZERO,
            Ok(TransactionFeed {
                records: vec![record("1", "0100"), record("2", "0200"), record("3", "0800")],
                pagination: PaginationState::from_response(1, None, 500),
            }),
        );

        let (feed, surface, _) = feed_with(&portal, ViewLayout::system());
        feed.refresh_metrics(500).await.unwrap();

        assert_eq!(portal.queries()[0].limit, 500);
        let metrics = surface.content(Region::TransactionMetrics).await.unwrap();
        assert!(metrics.starts_with("Transaction Metrics (3 sampled)"));
    }

    #[tokio::test]
    async fn test_detail_success_and_not_found() {
        let portal = Arc::new(FakePortal::new());
        let mut detail = record("TX9", "0200");
        detail.raw_message = Some("0200F23A...".to_string());
        portal.insert_detail(detail.clone());

        let (feed, surface, _) = feed_with(&portal, ViewLayout::transactions());
        feed.show_detail("TX9").await.unwrap();
        assert_eq!(
            surface.content(Region::TransactionDetail).await,
            Some(render_detail(&detail))
        );

        let err = feed.show_detail("missing").await.unwrap_err();
        assert!(matches!(err, NetworkFailure::Status { code: 404, .. }));
        let content = surface.content(Region::TransactionDetail).await.unwrap();
        assert!(content.starts_with("! Failed to load transaction details"));
    }
}
