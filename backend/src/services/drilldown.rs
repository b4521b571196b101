//! Exact-price drilldown under a concrete route.

use std::collections::BTreeMap;

use crate::api::{AnchorComparison, DrilldownEvent, HourBin, PriceDrilldown};
use crate::db::repository::ExposureRepository;
use crate::models::{
    hour_label, normalize_strict, parse_non_negative, ExposureEvent, FilterCriteria, FilterError,
    RawFilterQuery,
};
use crate::routes::drilldown::DRILLDOWN_LIMIT;

use super::aggregation::round2;
use super::{QueryContext, ServiceResult};

/// Validated drilldown input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrilldownRequest {
    pub price: i64,
    /// Route-level criteria; price bounds and travel dates are never applied.
    pub criteria: FilterCriteria,
    pub anchor: Option<i64>,
}

/// Validate drilldown parameters. The route (airline, origin, dest, tripType)
/// and `priceKRW` are required; `anchorPrice` is optional.
pub fn parse_drilldown(
    raw: &RawFilterQuery,
    price: Option<&str>,
    anchor: Option<&str>,
) -> Result<DrilldownRequest, FilterError> {
    let criteria = normalize_strict(raw)?.route_scope();
    let price = parse_non_negative("priceKRW", price)?
        .ok_or(FilterError::MissingField { field: "priceKRW" })?;
    let anchor = parse_non_negative("anchorPrice", anchor)?;
    Ok(DrilldownRequest {
        price,
        criteria,
        anchor,
    })
}

/// Comparison against `anchor`, or `None` unless the anchor is positive.
pub fn compare_to_anchor(price: i64, anchor: Option<i64>) -> Option<AnchorComparison> {
    let anchor = anchor.filter(|a| *a > 0)?;
    let diff = price - anchor;
    Some(AnchorComparison {
        anchor_price: anchor,
        diff_from_anchor: diff,
        diff_pct: round2(diff as f64 / anchor as f64 * 100.0),
    })
}

/// Per-hour counts labelled `YYYY-MM-DD HH:00`, ascending.
pub fn hour_bins(events: &[ExposureEvent]) -> Vec<HourBin> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for event in events {
        *counts.entry(hour_label(event.timestamp)).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(hour, count)| HourBin { hour, count })
        .collect()
}

pub async fn drilldown(
    repo: &dyn ExposureRepository,
    request: &DrilldownRequest,
    ctx: &QueryContext,
) -> ServiceResult<PriceDrilldown> {
    ctx.bounded("by_price", async {
        let cutoff = ctx.cutoff(request.criteria.period());
        let events = repo
            .fetch_by_exact_price(request.price, &request.criteria, cutoff, DRILLDOWN_LIMIT)
            .await?;

        Ok(PriceDrilldown {
            price: request.price,
            total: events.len(),
            hour_bins: hour_bins(&events),
            events: events.iter().map(DrilldownEvent::from).collect(),
            anchor: compare_to_anchor(request.price, request.anchor),
        })
    })
    .await
}
