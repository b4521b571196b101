//! Recency windows and hour bucketing.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Coarse recency selector bounding which records are considered.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[default]
    #[serde(rename = "24h")]
    Last24Hours,
    #[serde(rename = "7d")]
    Last7Days,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Last24Hours => "24h",
            Period::Last7Days => "7d",
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            Period::Last24Hours => Duration::hours(24),
            Period::Last7Days => Duration::days(7),
        }
    }

    /// Absolute cutoff instant for this window relative to `now`.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.duration()
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "24h" => Ok(Self::Last24Hours),
            "7d" => Ok(Self::Last7Days),
            other => Err(format!("Unknown period: {}", other)),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved time window: the instant the request started and the cutoff
/// derived from it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct QueryWindow {
    pub now: DateTime<Utc>,
    pub period: Period,
    pub cutoff: DateTime<Utc>,
}

impl QueryWindow {
    pub fn resolve(period: Period, now: DateTime<Utc>) -> Self {
        Self {
            now,
            period,
            cutoff: period.cutoff(now),
        }
    }
}

/// UTC hour truncation used as the timeseries key, e.g. `2025-03-01T10:00:00Z`.
pub fn hour_key(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:00:00Z").to_string()
}

/// UTC hour label used by the drilldown breakdown, e.g. `2025-03-01 10:00`.
pub fn hour_label(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:00").to_string()
}
