//! Concurrent fan-out of every dashboard aggregate.
//!
//! All aggregates share one [`QueryContext`], so they see the same time window.
//! Each one succeeds or fails on its own; a failure is reported in place of
//! that aggregate's data and never hides the others.

use crate::api::{AggregateOutcome, DashboardData};
use crate::db::repository::ExposureRepository;
use crate::models::{FilterCriteria, FilterError};

use super::{exposures, options, QueryContext, ServiceResult};

/// Dashboard input. A rejected `binSize` only fails the histogram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardRequest {
    pub criteria: FilterCriteria,
    pub bin_size: Result<i64, FilterError>,
}

fn outcome<T>(result: ServiceResult<T>) -> AggregateOutcome<T> {
    match result {
        Ok(data) => AggregateOutcome::Ok { data },
        Err(err) => AggregateOutcome::Error {
            kind: err.kind().to_string(),
            message: err.to_string(),
        },
    }
}

pub async fn dashboard(
    repo: &dyn ExposureRepository,
    request: &DashboardRequest,
    ctx: &QueryContext,
) -> DashboardData {
    let criteria = &request.criteria;
    let histogram = async {
        let bin_size = request.bin_size.clone()?;
        exposures::histogram(repo, criteria, bin_size, ctx).await
    };

    let (summary, histogram, timeseries, recent, price_counts, options) = tokio::join!(
        exposures::summary(repo, criteria, ctx),
        histogram,
        exposures::timeseries(repo, criteria, ctx),
        exposures::recent(repo, criteria, ctx),
        exposures::price_counts(repo, criteria, ctx),
        options::resolve_options(repo, criteria, ctx),
    );

    let data = DashboardData {
        summary: outcome(summary),
        histogram: outcome(histogram),
        timeseries: outcome(timeseries),
        recent: outcome(recent),
        price_counts: outcome(price_counts),
        options: outcome(options),
    };
    log::debug!(
        "dashboard resolved ({} of 6 aggregates ok)",
        [
            data.summary.is_ok(),
            data.histogram.is_ok(),
            data.timeseries.is_ok(),
            data.recent.is_ok(),
            data.price_counts.is_ok(),
            data.options.is_ok(),
        ]
        .iter()
        .filter(|ok| **ok)
        .count()
    );
    data
}
