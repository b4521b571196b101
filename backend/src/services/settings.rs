//! Per-request query limits.

use std::time::Duration;

use crate::routes::recent::RECENT_LIMIT;

/// Deadline and result-size limits applied to every aggregate request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuerySettings {
    /// Upper bound on the time one aggregate may wait for the store.
    pub timeout: Duration,
    /// Number of records returned by the recent list.
    pub recent_limit: usize,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(10_000),
            recent_limit: RECENT_LIMIT,
        }
    }
}

impl QuerySettings {
    /// Reads `FARE_QUERY_TIMEOUT_MS` and `FARE_RECENT_LIMIT`. Unset or
    /// unparsable values keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let timeout = read_env::<u64>("FARE_QUERY_TIMEOUT_MS")
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(defaults.timeout);
        let recent_limit = read_env::<usize>("FARE_RECENT_LIMIT")
            .filter(|n| *n > 0)
            .unwrap_or(defaults.recent_limit);
        Self {
            timeout,
            recent_limit,
        }
    }
}

fn read_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("ignoring invalid {}={:?}", key, raw);
            None
        }
    }
}
