use serde::{Deserialize, Serialize};

// =========================================================
// Timeseries types + route
// =========================================================

/// Aggregates for one UTC hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeseriesPoint {
    /// Hour truncation, `YYYY-MM-DDTHH:00:00Z`.
    pub hour: String,
    pub avg_price: i64,
    pub median_price: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesData {
    pub interval: String,
    pub points: Vec<TimeseriesPoint>,
}

/// Bucket width reported by the timeseries endpoint.
pub const TIMESERIES_INTERVAL: &str = "1h";

/// Route path for the timeseries endpoint
pub const TIMESERIES_PATH: &str = "/exposures/timeseries";
