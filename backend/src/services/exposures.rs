//! Summary, histogram, timeseries, recent and price-count aggregates.
//!
//! Each aggregate issues one filtered fetch and hands the rows to the pure
//! functions in [`super::aggregation`].

use crate::api::{
    HistogramData, PriceCountsData, RecentData, RecentExposure, SummaryData, TimeseriesData,
};
use crate::db::repository::ExposureRepository;
use crate::models::{ExposureEvent, FilterCriteria};
use crate::routes::timeseries::TIMESERIES_INTERVAL;

use super::aggregation::{
    compute_histogram, compute_mode_bin, compute_percentiles, compute_timeseries,
    count_unique_sessions, rank_price_counts, PRICE_COUNT_TOP_K,
};
use super::{QueryContext, ServiceResult};

/// Bin width used for the summary's mode bin, independent of the histogram
/// endpoint's `binSize`.
pub const SUMMARY_MODE_BIN_SIZE: i64 = 50_000;

async fn fetch(
    repo: &dyn ExposureRepository,
    criteria: &FilterCriteria,
    ctx: &QueryContext,
) -> ServiceResult<Vec<ExposureEvent>> {
    let cutoff = ctx.cutoff(criteria.period());
    Ok(repo.fetch_exposures(criteria, cutoff).await?)
}

fn prices(events: &[ExposureEvent]) -> Vec<i64> {
    events.iter().map(|e| e.price_krw).collect()
}

pub fn build_summary(events: &[ExposureEvent]) -> SummaryData {
    let prices = prices(events);
    let percentiles = compute_percentiles(&prices);
    let bins = compute_histogram(&prices, SUMMARY_MODE_BIN_SIZE);
    SummaryData {
        total_exposures: events.len(),
        unique_sessions: count_unique_sessions(events),
        percentiles,
        anchor_price: percentiles.p50,
        mode_bin: compute_mode_bin(&bins),
    }
}

pub async fn summary(
    repo: &dyn ExposureRepository,
    criteria: &FilterCriteria,
    ctx: &QueryContext,
) -> ServiceResult<SummaryData> {
    ctx.bounded("summary", async {
        let events = fetch(repo, criteria, ctx).await?;
        Ok(build_summary(&events))
    })
    .await
}

/// `bin_size` must already be validated by `normalize_bin_size`.
pub async fn histogram(
    repo: &dyn ExposureRepository,
    criteria: &FilterCriteria,
    bin_size: i64,
    ctx: &QueryContext,
) -> ServiceResult<HistogramData> {
    ctx.bounded("histogram", async {
        let events = fetch(repo, criteria, ctx).await?;
        Ok(HistogramData {
            bin_size,
            bins: compute_histogram(&prices(&events), bin_size),
        })
    })
    .await
}

pub async fn timeseries(
    repo: &dyn ExposureRepository,
    criteria: &FilterCriteria,
    ctx: &QueryContext,
) -> ServiceResult<TimeseriesData> {
    ctx.bounded("timeseries", async {
        let events = fetch(repo, criteria, ctx).await?;
        Ok(TimeseriesData {
            interval: TIMESERIES_INTERVAL.to_string(),
            points: compute_timeseries(&events),
        })
    })
    .await
}

/// Newest `ctx.recent_limit` matching records.
pub async fn recent(
    repo: &dyn ExposureRepository,
    criteria: &FilterCriteria,
    ctx: &QueryContext,
) -> ServiceResult<RecentData> {
    ctx.bounded("recent", async {
        let events = fetch(repo, criteria, ctx).await?;
        Ok(RecentData {
            items: events
                .iter()
                .take(ctx.recent_limit)
                .map(RecentExposure::from)
                .collect(),
        })
    })
    .await
}

pub async fn price_counts(
    repo: &dyn ExposureRepository,
    criteria: &FilterCriteria,
    ctx: &QueryContext,
) -> ServiceResult<PriceCountsData> {
    ctx.bounded("price_counts", async {
        let events = fetch(repo, criteria, ctx).await?;
        Ok(PriceCountsData {
            items: rank_price_counts(&prices(&events), PRICE_COUNT_TOP_K),
        })
    })
    .await
}
