//! # Fare Anchor Backend
//!
//! Price-exposure analytics for airline fare search results.
//!
//! Every time a fare is shown to a user an exposure event is recorded. This
//! crate filters those events and turns them into the aggregates a pricing
//! analyst looks at: percentiles and an anchor price, a price histogram with
//! its mode bin, an hourly timeseries, exact-price rankings, cascading filter
//! options and a drilldown into a single price.
//!
//! ## Architecture
//!
//! - [`models`]: Exposure records, filter normalization, time windows and predicates
//! - [`db`]: Record store trait with in-memory and Postgres implementations
//! - [`services`]: Aggregation, option resolution, drilldown and dashboard fan-out
//! - [`routes`]: Response payload types and route paths
//! - [`api`]: Public re-exports of the response types
//! - [`http`]: Axum-based HTTP server and request handlers

// RepositoryError carries rich context for debugging.
#![allow(clippy::result_large_err)]

pub mod api;

pub mod db;
pub mod models;

pub mod routes;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
