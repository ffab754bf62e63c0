//! Data models for the dashboard feed
//!
//! Records as the portal serves them (`TransactionRecord`, `StatusSnapshot`)
//! plus the state derived from them on every poll. Response envelopes live in
//! `api::portal::models`.

pub mod taxonomy;
pub mod status;
pub mod transaction;
pub mod pagination;
pub mod chart;

// Re-export commonly used types for convenience
pub use taxonomy::{ClassTally, MessageClass, MessageDirection, MessageTaxonomy};
pub use status::{Connectivity, StatusSnapshot, SystemState};
pub use transaction::{
    DecodedAmount, ResponseStatus, TransactionFeed, TransactionFilters, TransactionQuery,
    TransactionRecord,
};
pub use pagination::{PageWindow, PaginationState};
pub use chart::HourlyVolume;
