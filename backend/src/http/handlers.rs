//! HTTP handlers for the REST API.
//!
//! Each handler normalizes its query string, builds one request-scoped
//! `QueryContext` and delegates to the service layer. Validation happens
//! here, before any store call.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use std::time::Instant;

use super::dto::{
    DashboardData, ExposureCounts, ExposureQuery, FilterOptions, HealthResponse, HistogramData,
    IngestResponse, PriceCountsData, PriceDrilldown, RecentData, SummaryData, TimeseriesData,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::repository::ExposureRepository;
use crate::models::{normalize_bin_size, ExposureEvent, Period};
use crate::services::{self, DashboardRequest, QueryContext};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

async fn exposure_counts(
    repo: &dyn ExposureRepository,
    ctx: &QueryContext,
) -> crate::db::RepositoryResult<ExposureCounts> {
    let (total, last24h, last7d) = futures::try_join!(
        repo.count_exposures(None),
        repo.count_exposures(Some(ctx.cutoff(Period::Last24Hours))),
        repo.count_exposures(Some(ctx.cutoff(Period::Last7Days))),
    )?;
    Ok(ExposureCounts {
        total,
        last24h,
        last7d,
    })
}

/// GET /health
///
/// Reports store connectivity and, when reachable, record counts.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let repo = state.repository.as_ref();
    let database = match repo.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    let exposures = match exposure_counts(repo, &state.query_context()).await {
        Ok(counts) => Some(counts),
        Err(e) => {
            tracing::warn!(error = %e, "could not count exposures for health check");
            None
        }
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database,
        exposures,
    }))
}

// =============================================================================
// Ingestion
// =============================================================================

/// POST /v1/exposures
///
/// Store a list of exposure events. Ids are generated when absent.
pub async fn ingest_exposures(
    State(state): State<AppState>,
    Json(events): Json<Vec<ExposureEvent>>,
) -> Result<(StatusCode, Json<IngestResponse>), AppError> {
    let received = events.len();
    let inserted = state.repository.insert_exposures(events).await?;
    tracing::info!(received, inserted, "ingested exposure events");
    Ok((StatusCode::CREATED, Json(IngestResponse { inserted })))
}

// =============================================================================
// Aggregates
// =============================================================================

/// GET /v1/exposures/summary
pub async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<ExposureQuery>,
) -> HandlerResult<SummaryData> {
    let criteria = query.criteria()?;
    let ctx = state.query_context();
    let data = services::summary(state.repository.as_ref(), &criteria, &ctx).await?;
    Ok(Json(data))
}

/// GET /v1/exposures/histogram
pub async fn get_histogram(
    State(state): State<AppState>,
    Query(query): Query<ExposureQuery>,
) -> HandlerResult<HistogramData> {
    let criteria = query.criteria()?;
    let bin_size = normalize_bin_size(query.bin_size.as_deref())?;
    let ctx = state.query_context();
    let data = services::histogram(state.repository.as_ref(), &criteria, bin_size, &ctx).await?;
    Ok(Json(data))
}

/// GET /v1/exposures/timeseries
pub async fn get_timeseries(
    State(state): State<AppState>,
    Query(query): Query<ExposureQuery>,
) -> HandlerResult<TimeseriesData> {
    let criteria = query.criteria()?;
    let ctx = state.query_context();
    let data = services::timeseries(state.repository.as_ref(), &criteria, &ctx).await?;
    Ok(Json(data))
}

/// GET /v1/exposures/recent
pub async fn get_recent(
    State(state): State<AppState>,
    Query(query): Query<ExposureQuery>,
) -> HandlerResult<RecentData> {
    let criteria = query.criteria()?;
    let ctx = state.query_context();
    let data = services::recent(state.repository.as_ref(), &criteria, &ctx).await?;
    Ok(Json(data))
}

/// GET /v1/exposures/price-counts
pub async fn get_price_counts(
    State(state): State<AppState>,
    Query(query): Query<ExposureQuery>,
) -> HandlerResult<PriceCountsData> {
    let criteria = query.criteria()?;
    let ctx = state.query_context();
    let data = services::price_counts(state.repository.as_ref(), &criteria, &ctx).await?;
    Ok(Json(data))
}

/// GET /v1/exposures/options
///
/// Never strict: options exist precisely to help fill in a partial route.
pub async fn get_options(
    State(state): State<AppState>,
    Query(query): Query<ExposureQuery>,
) -> HandlerResult<FilterOptions> {
    let criteria = crate::models::normalize(&query.filters)?;
    let ctx = state.query_context();
    let data = services::resolve_options(state.repository.as_ref(), &criteria, &ctx).await?;
    Ok(Json(data))
}

/// GET /v1/exposures/by-price
pub async fn get_by_price(
    State(state): State<AppState>,
    Query(query): Query<ExposureQuery>,
) -> HandlerResult<PriceDrilldown> {
    let request = services::parse_drilldown(
        &query.filters,
        query.price_krw.as_deref(),
        query.anchor_price.as_deref(),
    )?;
    let ctx = state.query_context();
    let data = services::drilldown(state.repository.as_ref(), &request, &ctx).await?;
    Ok(Json(data))
}

/// GET /v1/exposures/dashboard
///
/// Always 200 once the filters validate; per-aggregate failures are reported
/// inside the body.
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<ExposureQuery>,
) -> HandlerResult<DashboardData> {
    let request = DashboardRequest {
        criteria: query.criteria()?,
        bin_size: normalize_bin_size(query.bin_size.as_deref()),
    };
    let ctx = state.query_context();
    let started = Instant::now();
    let data = services::dashboard(state.repository.as_ref(), &request, &ctx).await;
    tracing::info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        "dashboard computed"
    );
    Ok(Json(data))
}
