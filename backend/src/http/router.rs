//! Router configuration for the HTTP API.
//!
//! Sets up all routes and middleware (CORS, compression, tracing) and returns
//! the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;
use crate::routes::{
    dashboard::DASHBOARD_PATH, drilldown::BY_PRICE_PATH, histogram::HISTOGRAM_PATH,
    options::OPTIONS_PATH, price_counts::PRICE_COUNTS_PATH, recent::RECENT_PATH,
    summary::SUMMARY_PATH, timeseries::TIMESERIES_PATH, EXPOSURES_PATH, HEALTH_PATH,
};

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        .route(EXPOSURES_PATH, post(handlers::ingest_exposures))
        .route(SUMMARY_PATH, get(handlers::get_summary))
        .route(HISTOGRAM_PATH, get(handlers::get_histogram))
        .route(TIMESERIES_PATH, get(handlers::get_timeseries))
        .route(RECENT_PATH, get(handlers::get_recent))
        .route(PRICE_COUNTS_PATH, get(handlers::get_price_counts))
        .route(OPTIONS_PATH, get(handlers::get_options))
        .route(BY_PRICE_PATH, get(handlers::get_by_price))
        .route(DASHBOARD_PATH, get(handlers::get_dashboard));

    Router::new()
        .route(HEALTH_PATH, get(handlers::health_check))
        .nest("/v1", api_v1)
        // Ingestion batches can be large.
        .layer(DefaultBodyLimit::max(16 * 1024 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
