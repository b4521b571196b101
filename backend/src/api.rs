//! Public API surface for the fare exposure backend.
//!
//! This file consolidates the DTO types returned by the HTTP API.
//! All types derive Serialize/Deserialize for JSON serialization.

pub use crate::routes::dashboard::AggregateOutcome;
pub use crate::routes::dashboard::DashboardData;
pub use crate::routes::drilldown::AnchorComparison;
pub use crate::routes::drilldown::DrilldownEvent;
pub use crate::routes::drilldown::HourBin;
pub use crate::routes::drilldown::PriceDrilldown;
pub use crate::routes::histogram::HistogramBin;
pub use crate::routes::histogram::HistogramData;
pub use crate::routes::options::FilterOptions;
pub use crate::routes::price_counts::PriceCountEntry;
pub use crate::routes::price_counts::PriceCountsData;
pub use crate::routes::recent::RecentData;
pub use crate::routes::recent::RecentExposure;
pub use crate::routes::summary::PercentileSet;
pub use crate::routes::summary::SummaryData;
pub use crate::routes::timeseries::TimeseriesData;
pub use crate::routes::timeseries::TimeseriesPoint;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Exposure record identifier (database primary key).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExposureId(pub Uuid);

impl ExposureId {
    pub fn new(value: Uuid) -> Self {
        ExposureId(value)
    }

    /// Fresh random identifier for records ingested without one.
    pub fn generate() -> Self {
        ExposureId(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ExposureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
