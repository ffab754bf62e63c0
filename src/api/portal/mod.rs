pub mod client;
pub mod models;
#[cfg(test)]
pub mod fake;

pub use client::PortalClient;
pub use models::NetworkFailure;

use async_trait::async_trait;

use crate::models::status::StatusSnapshot;
use crate::models::transaction::TransactionRecord;
use crate::models::{HourlyVolume, TransactionFeed, TransactionQuery};

/// Read-only view of the switch's monitoring API.
///
/// Responses come back already normalized; callers never see the wire shape.
#[async_trait]
pub trait PortalApi: Send + Sync {
    async fn status(&self) -> Result<StatusSnapshot, NetworkFailure>;

    async fn transactions(&self, query: &TransactionQuery) -> Result<TransactionFeed, NetworkFailure>;

    async fn transaction(&self, id: &str) -> Result<TransactionRecord, NetworkFailure>;

    async fn hourly_stats(&self) -> Result<HourlyVolume, NetworkFailure>;
}
