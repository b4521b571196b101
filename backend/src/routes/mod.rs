pub mod dashboard;
pub mod drilldown;
pub mod histogram;
pub mod options;
pub mod price_counts;
pub mod recent;
pub mod summary;
pub mod timeseries;

/// Route path for the ingestion endpoint
pub const EXPOSURES_PATH: &str = "/exposures";

/// Route path for the health endpoint (outside the versioned prefix)
pub const HEALTH_PATH: &str = "/health";
