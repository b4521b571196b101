use serde::{Deserialize, Serialize};

use super::histogram::HistogramBin;

// =========================================================
// Summary types + route
// =========================================================

/// Nearest-rank percentiles of the filtered price column.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PercentileSet {
    pub p25: i64,
    pub p50: i64,
    pub p75: i64,
}

/// Headline statistics for the filtered exposures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryData {
    pub total_exposures: usize,
    pub unique_sessions: usize,
    #[serde(flatten)]
    pub percentiles: PercentileSet,
    /// Reference price other prices are compared against; always `p50`.
    pub anchor_price: i64,
    pub mode_bin: Option<HistogramBin>,
}

/// Route path for the summary endpoint
pub const SUMMARY_PATH: &str = "/exposures/summary";
