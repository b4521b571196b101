use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Channel, ExposureEvent};

// =========================================================
// Exact-price drilldown types + route
// =========================================================

/// Count of matching records within one UTC hour, labelled `YYYY-MM-DD HH:00`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourBin {
    pub hour: String,
    pub count: usize,
}

/// One matching record, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrilldownEvent {
    pub ts: DateTime<Utc>,
    pub channel: Channel,
    pub result_rank: i32,
    pub search_id: String,
    pub session_id: String,
}

impl From<&ExposureEvent> for DrilldownEvent {
    fn from(event: &ExposureEvent) -> Self {
        Self {
            ts: event.timestamp,
            channel: event.channel,
            result_rank: event.result_rank,
            search_id: event.search_id.clone(),
            session_id: event.session_id.clone(),
        }
    }
}

/// Difference between the drilled price and a positive anchor.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorComparison {
    pub anchor_price: i64,
    pub diff_from_anchor: i64,
    /// Percentage difference rounded to two decimals.
    pub diff_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceDrilldown {
    pub price: i64,
    pub total: usize,
    pub hour_bins: Vec<HourBin>,
    pub events: Vec<DrilldownEvent>,
    #[serde(flatten)]
    pub anchor: Option<AnchorComparison>,
}

/// Maximum number of records returned by a drilldown.
pub const DRILLDOWN_LIMIT: usize = 50;

/// Route path for the by-price endpoint
pub const BY_PRICE_PATH: &str = "/exposures/by-price";
