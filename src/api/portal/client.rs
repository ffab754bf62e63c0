use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client as HttpClient, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

use super::models::{NetworkFailure, TransactionsPayload};
use super::PortalApi;
use crate::models::status::StatusSnapshot;
use crate::models::transaction::TransactionRecord;
use crate::models::{HourlyVolume, TransactionFeed, TransactionQuery};

/// HTTP client for the payment switch's monitoring API
pub struct PortalClient {
    http_client: HttpClient,
    base_url: String,
}

impl PortalClient {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8000";

    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, NetworkFailure> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .default_headers(Self::create_headers())
            .build()
            .map_err(|e| NetworkFailure::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn create_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// `{base}/api/{path}`
    fn endpoint(&self, path: &str) -> Result<Url, NetworkFailure> {
        Url::parse(&format!("{}/api/{}", self.base_url, path))
            .map_err(|e| NetworkFailure::Request(format!("Invalid URL: {}", e)))
    }

    /// `{base}/api/transactions/{id}` with the id percent-encoded as one segment
    fn detail_endpoint(&self, id: &str) -> Result<Url, NetworkFailure> {
        let mut url = self.endpoint("transactions")?;
        url.path_segments_mut()
            .map_err(|_| NetworkFailure::Request(format!("Base URL cannot carry a path: {}", self.base_url)))?
            .push(id);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, NetworkFailure> {
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| NetworkFailure::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| NetworkFailure::Request(format!("Failed to read body: {}", e)))?;

        if !status.is_success() {
            warn!("{} answered {}", url.path(), status.as_u16());
            return Err(NetworkFailure::from_status(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| NetworkFailure::MalformedJson(e.to_string()))
    }
}

#[async_trait]
impl PortalApi for PortalClient {
    /// GET /api/status
    async fn status(&self) -> Result<StatusSnapshot, NetworkFailure> {
        self.get_json(self.endpoint("status")?, &[]).await
    }

    /// GET /api/transactions?limit=N&page=P[&mti=&response=&date=&search=]
    ///
    /// Accepts both the bare array and the `{transactions, metadata}` object.
    async fn transactions(&self, query: &TransactionQuery) -> Result<TransactionFeed, NetworkFailure> {
        let payload: TransactionsPayload = self
            .get_json(self.endpoint("transactions")?, &query.query_pairs())
            .await?;
        Ok(payload.normalize(query))
    }

    /// GET /api/transactions/{id}
    async fn transaction(&self, id: &str) -> Result<TransactionRecord, NetworkFailure> {
        self.get_json(self.detail_endpoint(id)?, &[]).await
    }

    /// GET /api/stats
    async fn hourly_stats(&self) -> Result<HourlyVolume, NetworkFailure> {
        let stats: HashMap<String, Value> = self.get_json(self.endpoint("stats")?, &[]).await?;
        Ok(HourlyVolume::from_stats(&stats))
    }
}
