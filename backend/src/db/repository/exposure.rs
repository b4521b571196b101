//! Record store contract for exposure events.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::RepositoryResult;
use crate::models::{Dimension, ExposureEvent, FilterCriteria};

/// Read and write access to stored exposure events.
///
/// Implementations translate [`FilterCriteria`] through
/// [`FilterCriteria::predicates`] so every backend applies identical filter
/// semantics. An empty result is `Ok(vec![])`; only a store that could not
/// answer returns `Err`.
#[async_trait]
pub trait ExposureRepository: Send + Sync {
    /// Check whether the store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// All records matching `criteria` with `timestamp >= cutoff`, newest first.
    async fn fetch_exposures(
        &self,
        criteria: &FilterCriteria,
        cutoff: DateTime<Utc>,
    ) -> RepositoryResult<Vec<ExposureEvent>>;

    /// Distinct non-empty values of `dimension` among matching records.
    ///
    /// Callers pass criteria already stripped of `dimension`'s own constraint.
    async fn fetch_distinct(
        &self,
        dimension: Dimension,
        criteria: &FilterCriteria,
        cutoff: DateTime<Utc>,
    ) -> RepositoryResult<Vec<String>>;

    /// Distinct `(origin, destination)` pairs among matching records.
    async fn fetch_route_pairs(
        &self,
        criteria: &FilterCriteria,
        cutoff: DateTime<Utc>,
    ) -> RepositoryResult<Vec<(String, String)>>;

    /// Up to `limit` matching records priced exactly `price`, newest first.
    async fn fetch_by_exact_price(
        &self,
        price: i64,
        criteria: &FilterCriteria,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> RepositoryResult<Vec<ExposureEvent>>;

    /// Number of stored records, optionally only those at or after `since`.
    async fn count_exposures(&self, since: Option<DateTime<Utc>>) -> RepositoryResult<u64>;

    /// Append records to the store and return how many were written.
    async fn insert_exposures(&self, events: Vec<ExposureEvent>) -> RepositoryResult<usize>;
}
