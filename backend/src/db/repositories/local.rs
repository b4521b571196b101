//! In-memory local repository implementation.
//!
//! Rows live in a `Vec` behind a lock, so results are fast, deterministic and
//! isolated per instance. Filtering goes through the same predicate list the
//! Postgres backend compiles into SQL.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::db::repository::{ErrorContext, ExposureRepository, RepositoryError, RepositoryResult};
use crate::models::{Dimension, ExposureEvent, FilterCriteria, Predicate};

/// In-memory local repository.
///
/// # Example
/// ```
/// use fare_anchor::db::repositories::LocalRepository;
///
/// let repo = LocalRepository::new();
/// assert_eq!(repo.event_count(), 0);
/// ```
#[derive(Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    events: Vec<ExposureEvent>,
    is_healthy: bool,
    // Artificial delay applied before every query.
    latency: Option<Duration>,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            is_healthy: true,
            latency: None,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated with `events`.
    pub fn with_events(events: impl IntoIterator<Item = ExposureEvent>) -> Self {
        let repo = Self::new();
        repo.store_events(events);
        repo
    }

    /// Append events directly, bypassing the async trait.
    pub fn store_events(&self, events: impl IntoIterator<Item = ExposureEvent>) -> usize {
        let mut data = self.data.write();
        let before = data.events.len();
        data.events.extend(events);
        data.events.len() - before
    }

    /// Simulate an unreachable store: every query fails with a connection error.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Delay every query by `latency`, or remove the delay with `None`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.data.write().latency = latency;
    }

    pub fn event_count(&self) -> usize {
        self.data.read().events.len()
    }

    async fn prepare(&self, operation: &str) -> RepositoryResult<()> {
        let (healthy, latency) = {
            let data = self.data.read();
            (data.is_healthy, data.latency)
        };
        if let Some(delay) = latency {
            tokio::time::sleep(delay).await;
        }
        if !healthy {
            return Err(RepositoryError::connection_with_context(
                "local repository marked unhealthy",
                ErrorContext::new(operation).with_entity("exposure_events"),
            ));
        }
        Ok(())
    }

    fn select<T>(
        &self,
        predicates: &[Predicate],
        project: impl Fn(&ExposureEvent) -> T,
    ) -> Vec<(DateTime<Utc>, T)> {
        let data = self.data.read();
        let mut rows: Vec<(DateTime<Utc>, T)> = data
            .events
            .iter()
            .filter(|event| predicates.iter().all(|p| p.matches(event)))
            .map(|event| (event.timestamp, project(event)))
            .collect();
        rows.sort_by(|a, b| b.0.cmp(&a.0));
        rows
    }
}

#[async_trait]
impl ExposureRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn fetch_exposures(
        &self,
        criteria: &FilterCriteria,
        cutoff: DateTime<Utc>,
    ) -> RepositoryResult<Vec<ExposureEvent>> {
        self.prepare("fetch_exposures").await?;
        let predicates = criteria.predicates(cutoff);
        log::debug!("local fetch_exposures with {} predicates", predicates.len());
        Ok(self
            .select(&predicates, Clone::clone)
            .into_iter()
            .map(|(_, event)| event)
            .collect())
    }

    async fn fetch_distinct(
        &self,
        dimension: Dimension,
        criteria: &FilterCriteria,
        cutoff: DateTime<Utc>,
    ) -> RepositoryResult<Vec<String>> {
        self.prepare("fetch_distinct").await?;
        let predicates = criteria.predicates(cutoff);
        let values: BTreeSet<String> = self
            .select(&predicates, |event| event.dimension_value(dimension).to_string())
            .into_iter()
            .map(|(_, value)| value)
            .filter(|value| !value.is_empty())
            .collect();
        Ok(values.into_iter().collect())
    }

    async fn fetch_route_pairs(
        &self,
        criteria: &FilterCriteria,
        cutoff: DateTime<Utc>,
    ) -> RepositoryResult<Vec<(String, String)>> {
        self.prepare("fetch_route_pairs").await?;
        let predicates = criteria.predicates(cutoff);
        let pairs: BTreeSet<(String, String)> = self
            .select(&predicates, |event| {
                (event.origin.clone(), event.destination.clone())
            })
            .into_iter()
            .map(|(_, pair)| pair)
            .collect();
        Ok(pairs.into_iter().collect())
    }

    async fn fetch_by_exact_price(
        &self,
        price: i64,
        criteria: &FilterCriteria,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> RepositoryResult<Vec<ExposureEvent>> {
        self.prepare("fetch_by_exact_price").await?;
        let mut predicates = criteria.predicates(cutoff);
        predicates.push(Predicate::PriceEquals(price));
        Ok(self
            .select(&predicates, Clone::clone)
            .into_iter()
            .take(limit)
            .map(|(_, event)| event)
            .collect())
    }

    async fn count_exposures(&self, since: Option<DateTime<Utc>>) -> RepositoryResult<u64> {
        self.prepare("count_exposures").await?;
        let data = self.data.read();
        let count = match since {
            Some(since) => data.events.iter().filter(|e| e.timestamp >= since).count(),
            None => data.events.len(),
        };
        Ok(count as u64)
    }

    async fn insert_exposures(&self, events: Vec<ExposureEvent>) -> RepositoryResult<usize> {
        self.prepare("insert_exposures").await?;
        Ok(self.store_events(events))
    }
}
