//! Service layer: turns normalized filter criteria into aggregate payloads.
//!
//! Every operation takes the record store as `&dyn ExposureRepository` plus a
//! [`QueryContext`] created once per request, so all aggregates of one request
//! share the same `now` and the same deadline.

pub mod aggregation;
pub mod dashboard;
pub mod drilldown;
pub mod exposures;
pub mod options;
pub mod settings;

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::db::repository::RepositoryError;
use crate::models::{FilterError, Period, QueryWindow};

pub use dashboard::{dashboard, DashboardRequest};
pub use drilldown::{drilldown, parse_drilldown, DrilldownRequest};
pub use exposures::{histogram, price_counts, recent, summary, timeseries};
pub use options::resolve_options;
pub use settings::QuerySettings;

/// Failure of a single aggregate.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Filter input was rejected before any store call.
    #[error(transparent)]
    Validation(#[from] FilterError),
    /// The store failed or did not answer in time.
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

impl ServiceError {
    /// Failure category reported to callers: `validation`, `timeout` or `store`.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation",
            ServiceError::Store(e) if e.is_timeout() => "timeout",
            ServiceError::Store(_) => "store",
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Request-scoped time reference and limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryContext {
    pub now: DateTime<Utc>,
    pub timeout: Duration,
    pub recent_limit: usize,
}

impl QueryContext {
    pub fn new(settings: &QuerySettings, now: DateTime<Utc>) -> Self {
        Self {
            now,
            timeout: settings.timeout,
            recent_limit: settings.recent_limit,
        }
    }

    /// Context anchored at the current instant.
    pub fn starting_now(settings: &QuerySettings) -> Self {
        Self::new(settings, Utc::now())
    }

    pub fn window(&self, period: Period) -> QueryWindow {
        QueryWindow::resolve(period, self.now)
    }

    pub fn cutoff(&self, period: Period) -> DateTime<Utc> {
        self.window(period).cutoff
    }

    /// Run one aggregate under the request deadline. Elapsing the deadline is
    /// reported as a store timeout naming `operation`.
    pub async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> ServiceResult<T>
    where
        F: Future<Output = ServiceResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                log::warn!("{} failed: {}", operation, err);
                Err(err)
            }
            Err(_) => {
                log::warn!("{} timed out after {:?}", operation, self.timeout);
                Err(RepositoryError::timeout(operation, self.timeout).into())
            }
        }
    }
}
