//! Property-based checks for the pure aggregation functions.

use fare_anchor::services::aggregation::{
    compute_histogram, compute_mode_bin, compute_percentiles, rank_price_counts,
};
use proptest::prelude::*;

fn prices() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(0i64..5_000_000, 0..200)
}

proptest! {
    #[test]
    fn prop_histogram_counts_every_price(prices in prices(), bin_size in 10_000i64..200_000) {
        let bins = compute_histogram(&prices, bin_size);
        let total: usize = bins.iter().map(|b| b.count).sum();
        prop_assert_eq!(total, prices.len());
    }

    #[test]
    fn prop_histogram_bins_aligned_and_contiguous(prices in prices(), bin_size in 10_000i64..200_000) {
        let bins = compute_histogram(&prices, bin_size);
        for bin in &bins {
            prop_assert_eq!(bin.bin_start % bin_size, 0);
            prop_assert_eq!(bin.bin_end - bin.bin_start, bin_size);
        }
        for pair in bins.windows(2) {
            prop_assert_eq!(pair[0].bin_end, pair[1].bin_start);
        }
        if let (Some(first), Some(last)) = (bins.first(), bins.last()) {
            prop_assert!(first.count > 0);
            prop_assert!(last.count > 0);
        }
    }

    #[test]
    fn prop_percentiles_ordered_and_observed(prices in prop::collection::vec(0i64..5_000_000, 1..200)) {
        let p = compute_percentiles(&prices);
        prop_assert!(p.p25 <= p.p50);
        prop_assert!(p.p50 <= p.p75);
        prop_assert!(prices.contains(&p.p25));
        prop_assert!(prices.contains(&p.p50));
        prop_assert!(prices.contains(&p.p75));
    }

    #[test]
    fn prop_mode_bin_is_densest_and_earliest(prices in prices(), bin_size in 10_000i64..200_000) {
        let bins = compute_histogram(&prices, bin_size);
        match compute_mode_bin(&bins) {
            None => prop_assert!(prices.is_empty()),
            Some(mode) => {
                let max = bins.iter().map(|b| b.count).max().unwrap_or(0);
                prop_assert_eq!(mode.count, max);
                let first_max = bins.iter().find(|b| b.count == max).map(|b| b.bin_start);
                prop_assert_eq!(Some(mode.bin_start), first_max);
            }
        }
    }

    #[test]
    fn prop_price_counts_ranked(prices in prop::collection::vec(0i64..50, 0..300)) {
        let ranked = rank_price_counts(&prices, 50);
        for pair in ranked.windows(2) {
            prop_assert!(
                pair[0].count > pair[1].count
                    || (pair[0].count == pair[1].count && pair[0].price < pair[1].price)
            );
        }
        let total: usize = ranked.iter().map(|e| e.count).sum();
        prop_assert_eq!(total, prices.len());
    }
}
