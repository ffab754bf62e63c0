//! Repeating fetch-and-render timers, one per data kind.
//!
//! Each kind fires once immediately and then on its own cadence. Every tick
//! spawns the cycle as a separate task: a slow cycle is never cancelled or
//! coalesced with the next one, and a failed cycle does not change the
//! schedule.

use futures::future::{BoxFuture, FutureExt};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

/// What a scheduled cycle fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Status,
    RecentTransactions,
    Transactions,
    Stats,
    HourlyVolume,
    ClassMetrics,
}

impl DataKind {
    pub const ALL: [DataKind; 6] = [
        DataKind::Status,
        DataKind::RecentTransactions,
        DataKind::Transactions,
        DataKind::Stats,
        DataKind::HourlyVolume,
        DataKind::ClassMetrics,
    ];

    /// Parse an operator-typed kind; accepts the full name or its first word
    pub fn from_name(name: &str) -> Option<DataKind> {
        let name = name.trim().to_ascii_lowercase();
        DataKind::ALL.into_iter().find(|kind| {
            let full = kind.name();
            full == name || full.split('-').next() == Some(name.as_str())
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            DataKind::Status => "status",
            DataKind::RecentTransactions => "recent-transactions",
            DataKind::Transactions => "transactions",
            DataKind::Stats => "stats",
            DataKind::HourlyVolume => "hourly-volume",
            DataKind::ClassMetrics => "class-metrics",
        }
    }
}

type Cycle = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

struct Job {
    every: Duration,
    cycle: Cycle,
    timer: JoinHandle<()>,
}

/// Timers of one view
pub struct Scheduler {
    jobs: HashMap<DataKind, Job>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            jobs: HashMap::new(),
        }
    }

    /// Start polling `kind` every `every`. Rescheduling a kind replaces its timer.
    pub fn schedule<F, Fut>(&mut self, kind: DataKind, every: Duration, cycle: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let every = every.max(Duration::from_millis(1));
        let cycle: Cycle = Arc::new(move || cycle().boxed());
        let timer = tokio::spawn(run_timer(kind, every, cycle.clone()));

        info!("Polling {} every {:?}", kind.name(), every);
        if let Some(previous) = self.jobs.insert(kind, Job { every, cycle, timer }) {
            previous.timer.abort();
        }
    }

    /// Run one extra cycle of `kind` now, outside its cadence
    pub fn trigger(&self, kind: DataKind) -> bool {
        match self.jobs.get(&kind) {
            Some(job) => {
                debug!("Manual refresh of {}", kind.name());
                tokio::spawn((job.cycle)());
                true
            }
            None => false,
        }
    }

    /// Run one extra cycle of every scheduled kind; returns how many fired
    pub fn trigger_all(&self) -> usize {
        for (kind, job) in &self.jobs {
            debug!("Manual refresh of {}", kind.name());
            tokio::spawn((job.cycle)());
        }
        self.jobs.len()
    }

    #[cfg(test)]
    pub fn interval_of(&self, kind: DataKind) -> Option<Duration> {
        self.jobs.get(&kind).map(|job| job.every)
    }

    /// Abort every timer. Cycles already in flight are left to finish on their own.
    pub fn stop(&mut self) {
        for (kind, job) in self.jobs.drain() {
            debug!("Stopping {} timer", kind.name());
            job.timer.abort();
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_timer(kind: DataKind, every: Duration, cycle: Cycle) {
    // The first tick of a tokio interval completes immediately
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut tick: u64 = 0;
    loop {
        ticker.tick().await;
        tick += 1;
        debug!(kind = kind.name(), tick, "cycle fired");
        tokio::spawn(cycle());
    }
}
