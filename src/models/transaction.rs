//! Transaction models

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use super::pagination::PaginationState;

/// A transaction row as served by `/api/transactions`
///
/// Every field is optional. The backend mixes strings and numbers for ids and
/// amounts, so textual fields accept either and anything else becomes `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mti: Option<String>,
    /// Minor currency units, digits only
    #[serde(default, deserialize_with = "lenient_string")]
    pub amount: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub response_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub terminal_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub merchant_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub processing_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub stan: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub rrn: Option<String>,
    #[serde(default, alias = "transmissionDateTime", deserialize_with = "lenient_string")]
    pub transmission_datetime: Option<String>,
    /// Ingestion time on the processor side
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub raw_message: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub access_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub direction: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Normalized `/api/transactions` response, whatever shape the backend sent
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionFeed {
    pub records: Vec<TransactionRecord>,
    pub pagination: PaginationState,
}

/// Paging and filter parameters for a transactions fetch
///
/// Filters combine with AND on the backend; empty ones are not sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionQuery {
    pub limit: u32,
    pub page: u32,
    pub mti: Option<String>,
    pub response: Option<String>,
    pub date: Option<String>,
    pub search: Option<String>,
}

impl TransactionQuery {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            page: 1,
            mti: None,
            response: None,
            date: None,
            search: None,
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Replace the whole filter set and go back to the first page
    pub fn set_filters(&mut self, filters: TransactionFilters) {
        self.mti = filters.mti;
        self.response = filters.response;
        self.date = filters.date;
        self.search = filters.search;
        self.page = 1;
    }

    /// Query string pairs in the order the portal sends them
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("limit", self.limit.to_string()), ("page", self.page.to_string())];

        let filters = [
            ("mti", &self.mti),
            ("response", &self.response),
            ("date", &self.date),
            ("search", &self.search),
        ];
        for (key, value) in filters {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                pairs.push((key, v.to_string()));
            }
        }

        pairs
    }
}

/// Filter part of a `TransactionQuery`; `None` means not filtered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilters {
    pub mti: Option<String>,
    pub response: Option<String>,
    pub date: Option<String>,
    pub search: Option<String>,
}

impl TransactionFilters {
    /// Parse `key=value` pairs (`mti`, `response`, `date`, `search`). Words
    /// without `=` continue the previous value, so searches may contain spaces.
    pub fn parse(input: &str) -> Result<Self, String> {
        let mut filters = TransactionFilters::default();
        let mut current: Option<&mut Option<String>> = None;

        for word in input.split_whitespace() {
            if let Some((key, value)) = word.split_once('=') {
                let slot = match key {
                    "mti" => &mut filters.mti,
                    "response" => &mut filters.response,
                    "date" => &mut filters.date,
                    "search" => &mut filters.search,
                    _ => return Err(format!("unknown filter '{}'", key)),
                };
                *slot = Some(value.to_string()).filter(|v| !v.is_empty());
                current = Some(slot);
            } else {
                match current.as_deref_mut() {
                    Some(Some(value)) => {
                        value.push(' ');
                        value.push_str(word);
                    }
                    Some(slot) => *slot = Some(word.to_string()),
                    None => return Err(format!("expected key=value, got '{}'", word)),
                }
            }
        }

        Ok(filters)
    }
}

/// Display form of a minor-unit amount
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedAmount {
    Value(String),
    /// No amount on the record; distinct from a zero amount
    Unavailable,
}

impl fmt::Display for DecodedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedAmount::Value(v) => write!(f, "{}", v),
            DecodedAmount::Unavailable => write!(f, "N/A"),
        }
    }
}

/// Outcome of a response code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseStatus {
    Approved,
    Declined { code: String },
    /// No response code yet
    Pending,
}

impl ResponseStatus {
    #[cfg(test)]
    pub fn is_ok(&self) -> bool {
        matches!(self, ResponseStatus::Approved)
    }

    pub fn label(&self) -> String {
        match self {
            ResponseStatus::Approved => "Approved".to_string(),
            ResponseStatus::Declined { code } => format!("Declined ({})", code),
            ResponseStatus::Pending => "Pending".to_string(),
        }
    }
}
