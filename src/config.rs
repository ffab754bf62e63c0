//! Runtime settings, read from the environment (and `.env` via dotenv).

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::api::PortalClient;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got '{value}'")]
    Invalid {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Poll cadence per data kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intervals {
    pub status: Duration,
    pub recent_transactions: Duration,
    pub transactions: Duration,
    pub stats: Duration,
    pub hourly_volume: Duration,
    pub class_metrics: Duration,
}

impl Default for Intervals {
    fn default() -> Self {
        Self {
            status: Duration::from_secs(10),
            recent_transactions: Duration::from_secs(15),
            transactions: Duration::from_secs(30),
            stats: Duration::from_secs(30),
            hourly_volume: Duration::from_secs(60),
            class_metrics: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub output_dir: Option<PathBuf>,
    pub request_timeout: Duration,
    pub page_size: u32,
    pub recent_limit: u32,
    pub metrics_sample: u32,
    pub max_page_links: u32,
    pub intervals: Intervals,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: PortalClient::DEFAULT_BASE_URL.to_string(),
            output_dir: None,
            request_timeout: Duration::from_secs(5),
            page_size: 50,
            recent_limit: 5,
            metrics_sample: 500,
            max_page_links: 5,
            intervals: Intervals::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Config::default();
        let intervals = defaults.intervals.clone();

        Ok(Self {
            base_url: get("DASH_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            output_dir: get("DASH_OUTPUT_DIR").map(PathBuf::from),
            request_timeout: seconds(&get, "DASH_REQUEST_TIMEOUT_SECS", defaults.request_timeout)?,
            page_size: positive(&get, "DASH_PAGE_SIZE", defaults.page_size)?,
            recent_limit: positive(&get, "DASH_RECENT_LIMIT", defaults.recent_limit)?,
            metrics_sample: positive(&get, "DASH_METRICS_SAMPLE", defaults.metrics_sample)?,
            max_page_links: positive(&get, "DASH_MAX_PAGE_LINKS", defaults.max_page_links)?,
            intervals: Intervals {
                status: seconds(&get, "DASH_STATUS_INTERVAL_SECS", intervals.status)?,
                recent_transactions: seconds(
                    &get,
                    "DASH_RECENT_INTERVAL_SECS",
                    intervals.recent_transactions,
                )?,
                transactions: seconds(&get, "DASH_TRANSACTIONS_INTERVAL_SECS", intervals.transactions)?,
                stats: seconds(&get, "DASH_STATS_INTERVAL_SECS", intervals.stats)?,
                hourly_volume: seconds(&get, "DASH_HOURLY_INTERVAL_SECS", intervals.hourly_volume)?,
                class_metrics: seconds(&get, "DASH_METRICS_INTERVAL_SECS", intervals.class_metrics)?,
            },
        })
    }
}

fn positive<F>(get: &F, key: &'static str, default: u32) -> Result<u32, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(value) => match value.parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ConfigError::Invalid {
                key,
                value,
                expected: "a positive integer",
            }),
        },
    }
}

fn seconds<F>(get: &F, key: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let fallback = u32::try_from(default.as_secs()).unwrap_or(u32::MAX);
    positive(get, key, fallback).map(|secs| Duration::from_secs(u64::from(secs)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.intervals.status, Duration::from_secs(10));
        assert_eq!(config.intervals.hourly_volume, Duration::from_secs(60));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DASH_BASE_URL", "http://switch:9000/"),
            ("DASH_OUTPUT_DIR", "/tmp/dash"),
            ("DASH_PAGE_SIZE", "25"),
            ("DASH_STATUS_INTERVAL_SECS", " 3 "),
            ("DASH_RECENT_LIMIT", ""),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://switch:9000");
        assert_eq!(config.output_dir, Some(PathBuf::from("/tmp/dash")));
        assert_eq!(config.page_size, 25);
        assert_eq!(config.recent_limit, 5);
        assert_eq!(config.intervals.status, Duration::from_secs(3));
    }

    #[test]
    fn test_rejects_zero_and_garbage() {
        let err = Config::from_lookup(lookup(&[("DASH_STATS_INTERVAL_SECS", "0")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "DASH_STATS_INTERVAL_SECS",
                value: "0".to_string(),
                expected: "a positive integer",
            }
        );

        let err = Config::from_lookup(lookup(&[("DASH_PAGE_SIZE", "fifty")])).unwrap_err();
        assert_eq!(err.to_string(), "DASH_PAGE_SIZE must be a positive integer, got 'fifty'");
    }
}
