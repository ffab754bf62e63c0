use serde::Deserialize;
use thiserror::Error;

use crate::models::transaction::TransactionRecord;
use crate::models::{PaginationState, TransactionFeed, TransactionQuery};

/// `/api/transactions` body in either of the shapes the backend produces
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TransactionsPayload {
    /// Plain list, no paging metadata
    Bare(Vec<TransactionRecord>),
    Paged {
        #[serde(default)]
        transactions: Vec<TransactionRecord>,
        #[serde(default)]
        metadata: PageMetadata,
    },
}

/// Paging block of the object-shaped transactions response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    #[serde(default)]
    pub total_pages: Option<u32>,
}

impl TransactionsPayload {
    /// Collapse both shapes into one feed so nothing downstream branches on shape
    pub fn normalize(self, query: &TransactionQuery) -> TransactionFeed {
        let (records, total_pages) = match self {
            TransactionsPayload::Bare(records) => (records, None),
            TransactionsPayload::Paged {
                transactions,
                metadata,
            } => (transactions, metadata.total_pages),
        };

        TransactionFeed {
            records,
            pagination: PaginationState::from_response(query.page, total_pages, query.limit),
        }
    }
}

/// The one classified failure of a fetch cycle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkFailure {
    /// Connection refused, timeout, or the request never left
    #[error("Request failed: {0}")]
    Request(String),
    /// Non-success HTTP status
    #[error("HTTP {code}: {message}")]
    Status { code: u16, message: String },
    /// Body was not the JSON we expected
    #[error("Malformed response: {0}")]
    MalformedJson(String),
}

impl NetworkFailure {
    /// Build from a non-success status, preferring the backend's own message
    pub fn from_status(code: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|json| {
                json.get("message")
                    .or_else(|| json.get("error"))
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| body.trim().to_string());

        NetworkFailure::Status { code, message }
    }
}
