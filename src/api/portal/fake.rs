//! Scripted `PortalApi` for tests

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use super::{NetworkFailure, PortalApi};
use crate::models::status::StatusSnapshot;
use crate::models::transaction::TransactionRecord;
use crate::models::{HourlyVolume, TransactionFeed, TransactionQuery};

struct Scripted<T> {
    delay: Duration,
    result: Result<T, NetworkFailure>,
}

/// Queue of responses; the last one repeats once the queue is down to it
struct Script<T> {
    queue: Mutex<VecDeque<Scripted<T>>>,
}

impl<T: Clone> Script<T> {
    fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }

    fn push(&self, delay: Duration, result: Result<T, NetworkFailure>) {
        self.queue.lock().unwrap().push_back(Scripted { delay, result });
    }

    fn next(&self) -> (Duration, Result<T, NetworkFailure>) {
        let mut queue = self.queue.lock().unwrap();
        if queue.len() > 1 {
            let item = queue.pop_front().unwrap();
            return (item.delay, item.result);
        }
        match queue.front() {
            Some(item) => (item.delay, item.result.clone()),
            None => (
                Duration::ZERO,
                Err(NetworkFailure::Request("nothing scripted".to_string())),
            ),
        }
    }
}

pub struct FakePortal {
    status: Script<StatusSnapshot>,
    transactions: Script<TransactionFeed>,
    stats: Script<HourlyVolume>,
    details: Mutex<HashMap<String, TransactionRecord>>,
    queries: Mutex<Vec<TransactionQuery>>,
}

impl FakePortal {
    pub fn new() -> Self {
        Self {
            status: Script::new(),
            transactions: Script::new(),
            stats: Script::new(),
            details: Mutex::new(HashMap::new()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn push_status(&self, delay: Duration, result: Result<StatusSnapshot, NetworkFailure>) {
        self.status.push(delay, result);
    }

    pub fn push_transactions(&self, delay: Duration, result: Result<TransactionFeed, NetworkFailure>) {
        self.transactions.push(delay, result);
    }

    pub fn push_stats(&self, delay: Duration, result: Result<HourlyVolume, NetworkFailure>) {
        self.stats.push(delay, result);
    }

    pub fn insert_detail(&self, record: TransactionRecord) {
        let id = record.id.clone().unwrap_or_default();
        self.details.lock().unwrap().insert(id, record);
    }

    /// Every transactions query received, in call order
    pub fn queries(&self) -> Vec<TransactionQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl PortalApi for FakePortal {
    async fn status(&self) -> Result<StatusSnapshot, NetworkFailure> {
        let (delay, result) = self.status.next();
        tokio::time::sleep(delay).await;
        result
    }

    async fn transactions(&self, query: &TransactionQuery) -> Result<TransactionFeed, NetworkFailure> {
        self.queries.lock().unwrap().push(query.clone());
        let (delay, result) = self.transactions.next();
        tokio::time::sleep(delay).await;
        result
    }

    async fn transaction(&self, id: &str) -> Result<TransactionRecord, NetworkFailure> {
        self.details
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| NetworkFailure::Status {
                code: 404,
                message: format!("Transaction {} not found", id),
            })
    }

    async fn hourly_stats(&self) -> Result<HourlyVolume, NetworkFailure> {
        let (delay, result) = self.stats.next();
        tokio::time::sleep(delay).await;
        result
    }
}
