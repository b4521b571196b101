//! Data Transfer Objects for the HTTP API.
//!
//! Aggregate payloads are re-exported from [`crate::api`]; this module adds
//! the query-string and health/ingestion shapes that only the HTTP layer uses.

use serde::{Deserialize, Serialize};

pub use crate::api::{
    DashboardData, FilterOptions, HistogramData, PriceCountsData, PriceDrilldown, RecentData,
    SummaryData, TimeseriesData,
};
use crate::models::{
    normalize, normalize_strict, parse_flag, FilterCriteria, FilterError, RawFilterQuery,
};

/// Query string accepted by every `/v1/exposures/*` read endpoint.
///
/// Endpoint-specific parameters are ignored where they do not apply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposureQuery {
    #[serde(flatten)]
    pub filters: RawFilterQuery,
    #[serde(default)]
    pub bin_size: Option<String>,
    #[serde(default)]
    pub strict: Option<String>,
    #[serde(default, rename = "priceKRW")]
    pub price_krw: Option<String>,
    #[serde(default)]
    pub anchor_price: Option<String>,
}

impl ExposureQuery {
    /// Normalized criteria; `strict=1|true` additionally requires the route.
    pub fn criteria(&self) -> Result<FilterCriteria, FilterError> {
        if parse_flag(self.strict.as_deref()) {
            normalize_strict(&self.filters)
        } else {
            normalize(&self.filters)
        }
    }
}

/// Record counts reported by the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposureCounts {
    pub total: u64,
    pub last24h: u64,
    pub last7d: u64,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Database connection status
    pub database: String,
    /// Omitted when the store could not be counted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposures: Option<ExposureCounts>,
}

/// Response for exposure ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub inserted: usize,
}
