//! Pure aggregate computations over already-fetched exposure records.
//!
//! Nothing here performs I/O or fails: degenerate inputs produce the
//! documented zero, empty or `None` results.

use std::collections::{BTreeMap, HashMap};

use crate::api::{HistogramBin, PercentileSet, PriceCountEntry, TimeseriesPoint};
use crate::models::{hour_key, ExposureEvent};

/// Number of entries kept by [`rank_price_counts`].
pub const PRICE_COUNT_TOP_K: usize = 50;

/// Widest span, in bins, that [`compute_histogram`] fills with zero-count
/// bins. Wider spans only report occupied bins.
pub const MAX_FILLED_BINS: i64 = 10_000;

/// Nearest-rank percentile of an ascending-sorted slice.
///
/// Index is `max(0, ceil(p/100 * n) - 1)`; an empty slice yields 0.
pub fn nearest_rank(sorted: &[i64], p: u32) -> i64 {
    if sorted.is_empty() {
        return 0;
    }
    let n = sorted.len();
    let rank = (p as usize * n).div_ceil(100);
    let idx = rank.saturating_sub(1).min(n - 1);
    sorted[idx]
}

/// p25/p50/p75 of `prices`, which need not be sorted.
pub fn compute_percentiles(prices: &[i64]) -> PercentileSet {
    let mut sorted = prices.to_vec();
    sorted.sort_unstable();
    PercentileSet {
        p25: nearest_rank(&sorted, 25),
        p50: nearest_rank(&sorted, 50),
        p75: nearest_rank(&sorted, 75),
    }
}

/// Lower edge of the bin containing `price`.
fn bin_floor(price: i64, bin_size: i64) -> i64 {
    price.div_euclid(bin_size).saturating_mul(bin_size)
}

/// Contiguous price histogram.
///
/// Every bin between the lowest and highest occupied bin is present, zero
/// counts included, as long as the span is at most [`MAX_FILLED_BINS`].
/// Empty input or a non-positive `bin_size` yields no bins.
pub fn compute_histogram(prices: &[i64], bin_size: i64) -> Vec<HistogramBin> {
    if bin_size <= 0 {
        return Vec::new();
    }
    let (Some(&min), Some(&max)) = (prices.iter().min(), prices.iter().max()) else {
        return Vec::new();
    };

    // Bin arithmetic runs in i128 so edges near i64::MAX cannot wrap.
    let first = i128::from(bin_floor(min, bin_size));
    let last = i128::from(bin_floor(max, bin_size));
    let width = i128::from(bin_size);

    let span = (last - first) / width;

    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    if span < i128::from(MAX_FILLED_BINS) {
        for step in 0..=span {
            // Always within [first, last], so it fits back into i64.
            counts.insert((first + step * width) as i64, 0);
        }
    }
    for &price in prices {
        *counts.entry(bin_floor(price, bin_size)).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|(bin_start, count)| HistogramBin {
            bin_start,
            bin_end: bin_start.saturating_add(bin_size),
            count,
        })
        .collect()
}

/// Densest bin; on ties the lowest `bin_start` wins.
pub fn compute_mode_bin(bins: &[HistogramBin]) -> Option<HistogramBin> {
    let mut best: Option<HistogramBin> = None;
    for bin in bins {
        if best.map_or(true, |b| bin.count > b.count) {
            best = Some(*bin);
        }
    }
    best
}

/// Median of an ascending-sorted, non-empty slice.
fn median_sorted(sorted: &[i64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2] as f64
    } else {
        (sorted[n / 2 - 1] as f64 + sorted[n / 2] as f64) / 2.0
    }
}

/// Median with the even/odd rule; 0 for empty input.
pub fn median(prices: &[i64]) -> f64 {
    if prices.is_empty() {
        return 0.0;
    }
    let mut sorted = prices.to_vec();
    sorted.sort_unstable();
    median_sorted(&sorted)
}

/// Hourly count, average and median, ascending by UTC hour.
pub fn compute_timeseries(events: &[ExposureEvent]) -> Vec<TimeseriesPoint> {
    let mut by_hour: BTreeMap<String, Vec<i64>> = BTreeMap::new();
    for event in events {
        by_hour
            .entry(hour_key(event.timestamp))
            .or_default()
            .push(event.price_krw);
    }

    by_hour
        .into_iter()
        .map(|(hour, mut prices)| {
            prices.sort_unstable();
            let count = prices.len();
            let sum: i128 = prices.iter().map(|&p| p as i128).sum();
            let avg_price = (sum as f64 / count as f64).round() as i64;
            TimeseriesPoint {
                hour,
                avg_price,
                median_price: median_sorted(&prices),
                count,
            }
        })
        .collect()
}

/// Exact-price tallies, count descending then price ascending, top `top_k`.
pub fn rank_price_counts(prices: &[i64], top_k: usize) -> Vec<PriceCountEntry> {
    let mut tally: HashMap<i64, usize> = HashMap::new();
    for &price in prices {
        *tally.entry(price).or_insert(0) += 1;
    }

    let mut entries: Vec<PriceCountEntry> = tally
        .into_iter()
        .map(|(price, count)| PriceCountEntry { price, count })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then(a.price.cmp(&b.price)));
    entries.truncate(top_k);
    entries
}

/// Number of distinct session ids.
pub fn count_unique_sessions(events: &[ExposureEvent]) -> usize {
    events
        .iter()
        .map(|e| e.session_id.as_str())
        .collect::<std::collections::HashSet<_>>()
        .len()
}

/// `value` rounded half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
#[path = "aggregation_tests.rs"]
mod tests;
