use serde::{Deserialize, Serialize};

use super::histogram::HistogramData;
use super::options::FilterOptions;
use super::price_counts::PriceCountsData;
use super::recent::RecentData;
use super::summary::SummaryData;
use super::timeseries::TimeseriesData;

// =========================================================
// Dashboard fan-out types + route
// =========================================================

/// Per-aggregate result inside a dashboard response. A failing aggregate never
/// hides the others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AggregateOutcome<T> {
    Ok { data: T },
    Error { kind: String, message: String },
}

impl<T> AggregateOutcome<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, AggregateOutcome::Ok { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            AggregateOutcome::Ok { data } => Some(data),
            AggregateOutcome::Error { .. } => None,
        }
    }
}

/// All dashboard aggregates for one filter snapshot, evaluated concurrently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub summary: AggregateOutcome<SummaryData>,
    pub histogram: AggregateOutcome<HistogramData>,
    pub timeseries: AggregateOutcome<TimeseriesData>,
    pub recent: AggregateOutcome<RecentData>,
    pub price_counts: AggregateOutcome<PriceCountsData>,
    pub options: AggregateOutcome<FilterOptions>,
}

/// Route path for the dashboard endpoint
pub const DASHBOARD_PATH: &str = "/exposures/dashboard";
