use serde::{Deserialize, Serialize};

// =========================================================
// Price-count ranking types + route
// =========================================================

/// Number of records sharing one exact price.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceCountEntry {
    pub price: i64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceCountsData {
    pub items: Vec<PriceCountEntry>,
}

/// Route path for the price-count endpoint
pub const PRICE_COUNTS_PATH: &str = "/exposures/price-counts";
