use serde::{Deserialize, Serialize};

// =========================================================
// Histogram types + route
// =========================================================

/// Half-open price interval `[bin_start, bin_end)` and its record count.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBin {
    pub bin_start: i64,
    pub bin_end: i64,
    pub count: usize,
}

/// Price histogram for the filtered exposures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramData {
    pub bin_size: i64,
    pub bins: Vec<HistogramBin>,
}

/// Route path for the histogram endpoint
pub const HISTOGRAM_PATH: &str = "/exposures/histogram";
