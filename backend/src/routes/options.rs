use serde::{Deserialize, Serialize};

// =========================================================
// Cascading filter options types + route
// =========================================================

/// Values still selectable for each dimension given the other active filters.
///
/// A dimension's own constraint never restricts its option list, so a user can
/// always switch away from the current selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub airlines: Vec<String>,
    pub origins: Vec<String>,
    pub dests: Vec<String>,
    pub trip_types: Vec<String>,
    pub channels: Vec<String>,
    /// Distinct (origin, destination) pairs under the period and airline filter.
    pub available_pairs_count: usize,
}

/// Route path for the options endpoint
pub const OPTIONS_PATH: &str = "/exposures/options";
