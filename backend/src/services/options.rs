//! Cascading filter options.
//!
//! For each dimension the distinct values are looked up with that
//! dimension's own constraint removed, so the current selection never hides
//! its alternatives.

use std::collections::BTreeSet;

use crate::api::FilterOptions;
use crate::db::repository::ExposureRepository;
use crate::models::{Dimension, FilterCriteria};

use super::{QueryContext, ServiceResult};

fn sorted_unique(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .filter(|v| !v.trim().is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub async fn resolve_options(
    repo: &dyn ExposureRepository,
    criteria: &FilterCriteria,
    ctx: &QueryContext,
) -> ServiceResult<FilterOptions> {
    ctx.bounded("options", async {
        let cutoff = ctx.cutoff(criteria.period());
        let distinct = |dimension: Dimension| {
            let stripped = criteria.without(dimension);
            async move { repo.fetch_distinct(dimension, &stripped, cutoff).await }
        };
        let pair_scope = criteria.only_airline();

        let (airlines, origins, dests, trip_types, channels, pairs) = futures::try_join!(
            distinct(Dimension::Airline),
            distinct(Dimension::Origin),
            distinct(Dimension::Destination),
            distinct(Dimension::TripType),
            distinct(Dimension::Channel),
            repo.fetch_route_pairs(&pair_scope, cutoff),
        )?;

        let available_pairs_count = pairs.into_iter().collect::<BTreeSet<_>>().len();

        Ok(FilterOptions {
            airlines: sorted_unique(airlines),
            origins: sorted_unique(origins),
            dests: sorted_unique(dests),
            trip_types: sorted_unique(trip_types),
            channels: sorted_unique(channels),
            available_pairs_count,
        })
    })
    .await
}
