//! Hourly volume chart models

use serde_json::Value;
use std::collections::HashMap;

pub const HOURS_PER_DAY: usize = 24;

/// Transaction counts for every hour of the day
///
/// Always holds all 24 buckets so the chart's x-axis never shifts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HourlyVolume {
    counts: [u64; HOURS_PER_DAY],
}

impl HourlyVolume {
    /// Build from the `/api/stats` mapping of hour strings to counts.
    /// Keys outside 0..=23 and non-count values (the processor reports
    /// `{"error": -1}` on failure) are skipped.
    pub fn from_stats(stats: &HashMap<String, Value>) -> Self {
        let mut counts = [0u64; HOURS_PER_DAY];
        for (hour, count) in stats {
            let Ok(hour) = hour.trim().parse::<usize>() else {
                continue;
            };
            if hour >= HOURS_PER_DAY {
                continue;
            }
            if let Some(count) = count.as_u64() {
                counts[hour] = count;
            }
        }
        Self { counts }
    }

    #[cfg(test)]
    pub fn count(&self, hour: usize) -> u64 {
        self.counts.get(hour).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// "0:00" through "23:00", in numeric order
    pub fn labels() -> Vec<String> {
        (0..HOURS_PER_DAY).map(|h| format!("{}:00", h)).collect()
    }

    pub fn values(&self) -> Vec<u64> {
        self.counts.to_vec()
    }
}
