//! Named display regions whose content is swapped as a whole.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Stable identifiers of the display regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    StatusBadge,
    SystemStatus,
    RecentTransactions,
    Transactions,
    Pagination,
    TransactionDetail,
    TransactionMetrics,
}

impl Region {
    pub fn id(&self) -> &'static str {
        match self {
            Region::StatusBadge => "navbar-status-indicator",
            Region::SystemStatus => "system-status",
            Region::RecentTransactions => "recent-transactions",
            Region::Transactions => "transactions-table",
            Region::Pagination => "transaction-pagination",
            Region::TransactionDetail => "transaction-detail",
            Region::TransactionMetrics => "transaction-metrics",
        }
    }
}

/// The display: one text fragment per region.
///
/// `replace` swaps a region's whole content under one lock, so readers see
/// either the previous fragment or the new one, never a mix. Each update is
/// optionally mirrored to stdout and to `<out_dir>/<region>.txt`.
pub struct Surface {
    regions: Mutex<BTreeMap<Region, String>>,
    out_dir: Option<PathBuf>,
    echo: bool,
}

impl Surface {
    /// In-memory only
    pub fn new() -> Self {
        Self::with_output(None, false)
    }

    pub fn with_output(out_dir: Option<PathBuf>, echo: bool) -> Self {
        Self {
            regions: Mutex::new(BTreeMap::new()),
            out_dir,
            echo,
        }
    }

    pub async fn replace(&self, region: Region, fragment: String) {
        self.replace_all(vec![(region, fragment)]).await;
    }

    /// Swap several regions under a single lock, e.g. a table and its pagination bar
    pub async fn replace_all(&self, updates: Vec<(Region, String)>) {
        let mut regions = self.regions.lock().await;

        for (region, fragment) in updates {
            if let Some(dir) = &self.out_dir {
                if let Err(e) = write_region(dir, region, &fragment).await {
                    warn!("Failed to mirror region {}: {}", region.id(), e);
                }
            }
            if self.echo {
                println!("=== {} ===\n{}", region.id(), fragment.trim_end());
            }

            debug!("Region {} replaced ({} bytes)", region.id(), fragment.len());
            regions.insert(region, fragment);
        }
    }

    pub async fn content(&self, region: Region) -> Option<String> {
        self.regions.lock().await.get(&region).cloned()
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

/// Write to a temp file and rename over the target so readers never see a partial file
async fn write_region(dir: &Path, region: Region, fragment: &str) -> io::Result<()> {
    let target = dir.join(format!("{}.txt", region.id()));
    let staging = dir.join(format!(".{}.txt.tmp", region.id()));

    tokio::fs::write(&staging, fragment).await?;
    tokio::fs::rename(&staging, &target).await
}
