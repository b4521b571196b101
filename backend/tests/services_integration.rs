//! End-to-end service tests against the in-memory repository.

mod support;

use std::time::Duration;

use chrono::Duration as ChronoDuration;
use fare_anchor::db::LocalRepository;
use fare_anchor::models::{
    normalize, Channel, FilterCriteria, FilterError, Period, RawFilterQuery, TripType,
};
use fare_anchor::services::{
    self, DashboardRequest, QueryContext, QuerySettings, ServiceError,
};
use support::{fixed_now, ExposureBuilder};

fn ctx() -> QueryContext {
    QueryContext::new(&QuerySettings::default(), fixed_now())
}

fn ctx_with_timeout(timeout: Duration) -> QueryContext {
    let settings = QuerySettings {
        timeout,
        ..QuerySettings::default()
    };
    QueryContext::new(&settings, fixed_now())
}

fn raw(pairs: &[(&str, &str)]) -> RawFilterQuery {
    let map: serde_json::Map<String, serde_json::Value> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
        .collect();
    serde_json::from_value(serde_json::Value::Object(map)).unwrap()
}

fn route_repo() -> LocalRepository {
    let now = fixed_now();
    LocalRepository::with_events(vec![
        ExposureBuilder::new(now).airline("KE").route("ICN", "NRT").build(),
        ExposureBuilder::new(now).airline("KE").route("ICN", "KIX").build(),
        ExposureBuilder::new(now).airline("KE").route("PUS", "NRT").build(),
        ExposureBuilder::new(now).airline("OZ").route("ICN", "NRT").build(),
        ExposureBuilder::new(now)
            .airline("OZ")
            .route("GMP", "HND")
            .channel(Channel::Mobile)
            .trip_type(TripType::OneWay)
            .build(),
    ])
}

#[tokio::test]
async fn test_uniform_prices_summary_and_histogram() {
    let now = fixed_now();
    let repo = LocalRepository::with_events((0..10).map(|i| {
        ExposureBuilder::new(now)
            .price(500_000)
            .session(&format!("s{}", i % 4))
            .minutes_before(now, i)
            .build()
    }));
    let criteria = FilterCriteria::default();

    let summary = services::summary(&repo, &criteria, &ctx()).await.unwrap();
    assert_eq!(summary.total_exposures, 10);
    assert_eq!(summary.unique_sessions, 4);
    assert_eq!(summary.percentiles.p25, 500_000);
    assert_eq!(summary.percentiles.p50, 500_000);
    assert_eq!(summary.percentiles.p75, 500_000);
    assert_eq!(summary.anchor_price, 500_000);
    let mode = summary.mode_bin.unwrap();
    assert_eq!((mode.bin_start, mode.bin_end, mode.count), (500_000, 550_000, 10));

    let histogram = services::histogram(&repo, &criteria, 10_000, &ctx()).await.unwrap();
    assert_eq!(histogram.bin_size, 10_000);
    assert_eq!(histogram.bins.len(), 1);
    assert_eq!(histogram.bins[0].bin_start, 500_000);
    assert_eq!(histogram.bins[0].bin_end, 510_000);
    assert_eq!(histogram.bins[0].count, 10);
}

#[tokio::test]
async fn test_no_matches_yields_zero_results() {
    let repo = route_repo();
    let criteria = FilterCriteria::default().with_airlines(["ZZ"]);

    let summary = services::summary(&repo, &criteria, &ctx()).await.unwrap();
    assert_eq!(summary.total_exposures, 0);
    assert_eq!(summary.unique_sessions, 0);
    assert!(summary.mode_bin.is_none());

    let histogram = services::histogram(&repo, &criteria, 10_000, &ctx()).await.unwrap();
    assert!(histogram.bins.is_empty());

    let timeseries = services::timeseries(&repo, &criteria, &ctx()).await.unwrap();
    assert_eq!(timeseries.interval, "1h");
    assert!(timeseries.points.is_empty());
}

#[tokio::test]
async fn test_repeated_aggregates_are_byte_identical() {
    let now = fixed_now();
    let repo = LocalRepository::with_events((0..40).map(|i| {
        ExposureBuilder::new(now)
            .price(400_000 + (i * 7_919) % 90_000)
            .minutes_before(now, i * 17)
            .session(&format!("s{}", i % 9))
            .build()
    }));
    let criteria = FilterCriteria::default();

    let first = (
        services::summary(&repo, &criteria, &ctx()).await.unwrap(),
        services::histogram(&repo, &criteria, 10_000, &ctx()).await.unwrap(),
        services::timeseries(&repo, &criteria, &ctx()).await.unwrap(),
    );
    let second = (
        services::summary(&repo, &criteria, &ctx()).await.unwrap(),
        services::histogram(&repo, &criteria, 10_000, &ctx()).await.unwrap(),
        services::timeseries(&repo, &criteria, &ctx()).await.unwrap(),
    );
    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
}

#[tokio::test]
async fn test_period_bounds_records() {
    let now = fixed_now();
    let repo = LocalRepository::with_events(vec![
        ExposureBuilder::new(now).minutes_before(now, 60).build(),
        ExposureBuilder::new(now).minutes_before(now, 60 * 30).build(),
        ExposureBuilder::new(now).minutes_before(now, 60 * 24 * 8).build(),
    ]);

    let day = services::summary(&repo, &FilterCriteria::new(Period::Last24Hours), &ctx())
        .await
        .unwrap();
    assert_eq!(day.total_exposures, 1);

    let week = services::summary(&repo, &FilterCriteria::new(Period::Last7Days), &ctx())
        .await
        .unwrap();
    assert_eq!(week.total_exposures, 2);
}

#[tokio::test]
async fn test_price_range_is_inclusive() {
    let now = fixed_now();
    let repo = LocalRepository::with_events(
        [99_999, 100_000, 150_000, 200_000, 200_001]
            .into_iter()
            .map(|p| ExposureBuilder::new(now).price(p).build()),
    );
    let criteria = normalize(&raw(&[("minPrice", "100000"), ("maxPrice", "200000")])).unwrap();

    let counts = services::price_counts(&repo, &criteria, &ctx()).await.unwrap();
    let mut prices: Vec<i64> = counts.items.iter().map(|e| e.price).collect();
    prices.sort();
    assert_eq!(prices, vec![100_000, 150_000, 200_000]);
}

#[tokio::test]
async fn test_all_sentinel_is_unconstrained() {
    let repo = route_repo();
    let criteria = normalize(&raw(&[
        ("airline", "all"),
        ("origin", " "),
        ("channel", "ALL"),
    ]))
    .unwrap();
    assert_eq!(criteria, FilterCriteria::default());

    let summary = services::summary(&repo, &criteria, &ctx()).await.unwrap();
    assert_eq!(summary.total_exposures, 5);
}

#[tokio::test]
async fn test_airline_set_membership() {
    let repo = route_repo();
    let criteria = normalize(&raw(&[("airline", "KE, OZ")])).unwrap();
    let summary = services::summary(&repo, &criteria, &ctx()).await.unwrap();
    assert_eq!(summary.total_exposures, 5);

    let only_oz = normalize(&raw(&[("airline", "OZ")])).unwrap();
    let summary = services::summary(&repo, &only_oz, &ctx()).await.unwrap();
    assert_eq!(summary.total_exposures, 2);
}

#[tokio::test]
async fn test_options_exclude_own_dimension() {
    let repo = route_repo();
    let criteria = FilterCriteria::default()
        .with_airlines(["KE"])
        .with_origin("ICN");

    let options = services::resolve_options(&repo, &criteria, &ctx()).await.unwrap();

    // Origin options ignore the origin filter but honor the airline filter.
    assert_eq!(options.origins, vec!["ICN".to_string(), "PUS".to_string()]);
    // Destination options honor both airline and origin.
    assert_eq!(options.dests, vec!["KIX".to_string(), "NRT".to_string()]);
    // Airline options ignore the airline filter but honor origin.
    assert_eq!(options.airlines, vec!["KE".to_string(), "OZ".to_string()]);
    assert_eq!(options.trip_types, vec!["RT".to_string()]);
    assert_eq!(options.channels, vec!["web".to_string()]);
    // Pairs use only the airline filter: ICN-NRT, ICN-KIX, PUS-NRT.
    assert_eq!(options.available_pairs_count, 3);
}

#[tokio::test]
async fn test_changing_selection_keeps_own_options() {
    let repo = route_repo();
    let base = FilterCriteria::default().with_airlines(["KE"]);

    let from_icn = services::resolve_options(&repo, &base.clone().with_origin("ICN"), &ctx())
        .await
        .unwrap();
    let from_pus = services::resolve_options(&repo, &base.with_origin("PUS"), &ctx())
        .await
        .unwrap();

    assert_eq!(from_icn.origins, from_pus.origins);
    assert_ne!(from_icn.dests, from_pus.dests);
}

#[tokio::test]
async fn test_store_failure_is_not_empty_result() {
    let repo = LocalRepository::new();
    let criteria = FilterCriteria::default();

    let empty = services::summary(&repo, &criteria, &ctx()).await.unwrap();
    assert_eq!(empty.total_exposures, 0);

    repo.set_healthy(false);
    let err = services::summary(&repo, &criteria, &ctx()).await.unwrap_err();
    assert!(matches!(err, ServiceError::Store(_)));
    assert_eq!(err.kind(), "store");

    let err = services::resolve_options(&repo, &criteria, &ctx()).await.unwrap_err();
    assert_eq!(err.kind(), "store");
}

#[tokio::test]
async fn test_slow_store_reports_timeout() {
    let repo = LocalRepository::with_events(vec![ExposureBuilder::new(fixed_now()).build()]);
    repo.set_latency(Some(Duration::from_millis(300)));

    let err = services::histogram(
        &repo,
        &FilterCriteria::default(),
        10_000,
        &ctx_with_timeout(Duration::from_millis(20)),
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), "timeout");
    assert!(err.to_string().contains("histogram"));
}

#[tokio::test]
async fn test_recent_is_newest_first_and_limited() {
    let now = fixed_now();
    let repo = LocalRepository::with_events((0..45).map(|i| {
        ExposureBuilder::new(now).price(i).minutes_before(now, i).build()
    }));

    let recent = services::recent(&repo, &FilterCriteria::default(), &ctx()).await.unwrap();
    assert_eq!(recent.items.len(), 30);
    assert_eq!(recent.items[0].price_krw, 0);
    assert!(recent.items.windows(2).all(|w| w[0].ts >= w[1].ts));
}

#[tokio::test]
async fn test_drilldown_route_price_and_anchor() {
    let now = fixed_now();
    let mut events: Vec<_> = (0..60)
        .map(|i| {
            ExposureBuilder::new(now)
                .price(500_000)
                .minutes_before(now, i * 10)
                .build()
        })
        .collect();
    events.push(ExposureBuilder::new(now).price(510_000).build());
    events.push(ExposureBuilder::new(now).airline("OZ").price(500_000).build());
    let repo = LocalRepository::with_events(events);

    let query = raw(&[
        ("airline", "KE"),
        ("origin", "ICN"),
        ("dest", "NRT"),
        ("tripType", "RT"),
        ("minPrice", "900000"),
    ]);
    let request = services::parse_drilldown(&query, Some("500000"), Some("400000")).unwrap();
    let drill = services::drilldown(&repo, &request, &ctx()).await.unwrap();

    assert_eq!(drill.price, 500_000);
    assert_eq!(drill.total, 50);
    assert_eq!(drill.events.len(), 50);
    assert_eq!(drill.hour_bins.iter().map(|b| b.count).sum::<usize>(), 50);
    assert!(drill.hour_bins.windows(2).all(|w| w[0].hour < w[1].hour));
    let anchor = drill.anchor.unwrap();
    assert_eq!(anchor.diff_from_anchor, 100_000);
    assert_eq!(anchor.diff_pct, 25.0);
}

#[tokio::test]
async fn test_drilldown_rejects_partial_route() {
    let query = raw(&[("airline", "KE"), ("origin", "ICN"), ("dest", "NRT")]);
    assert_eq!(
        services::parse_drilldown(&query, Some("1"), None),
        Err(FilterError::MissingField { field: "tripType" })
    );
}

#[tokio::test]
async fn test_dashboard_isolates_failures() {
    let now = fixed_now();
    let repo = LocalRepository::with_events(vec![ExposureBuilder::new(now).build()]);
    let request = DashboardRequest {
        criteria: FilterCriteria::default(),
        bin_size: Err(FilterError::BinSizeTooSmall {
            value: 10,
            min: 10_000,
        }),
    };

    let data = services::dashboard(&repo, &request, &ctx()).await;
    assert!(data.summary.is_ok());
    assert!(data.timeseries.is_ok());
    assert!(data.recent.is_ok());
    assert!(data.price_counts.is_ok());
    assert!(data.options.is_ok());

    let json = serde_json::to_value(&data.histogram).unwrap();
    assert_eq!(json["status"], "error");
    assert_eq!(json["kind"], "validation");
}

#[tokio::test]
async fn test_dashboard_shares_window_across_aggregates() {
    let now = fixed_now();
    let repo = LocalRepository::with_events(vec![
        ExposureBuilder::new(now).at(now - ChronoDuration::hours(23)).build(),
        ExposureBuilder::new(now).at(now - ChronoDuration::hours(25)).build(),
    ]);
    let request = DashboardRequest {
        criteria: FilterCriteria::default(),
        bin_size: Ok(10_000),
    };

    let data = services::dashboard(&repo, &request, &ctx()).await;
    assert_eq!(data.summary.data().unwrap().total_exposures, 1);
    assert_eq!(data.recent.data().unwrap().items.len(), 1);
    let hist_total: usize = data.histogram.data().unwrap().bins.iter().map(|b| b.count).sum();
    assert_eq!(hist_total, 1);
}

#[tokio::test]
async fn test_dashboard_reports_store_failure_per_aggregate() {
    let repo = LocalRepository::new();
    repo.set_healthy(false);
    let request = DashboardRequest {
        criteria: FilterCriteria::default(),
        bin_size: Ok(10_000),
    };

    let data = services::dashboard(&repo, &request, &ctx()).await;
    let json = serde_json::to_value(&data).unwrap();
    for key in ["summary", "histogram", "timeseries", "recent", "priceCounts", "options"] {
        assert_eq!(json[key]["status"], "error", "{key}");
        assert_eq!(json[key]["kind"], "store", "{key}");
    }
}
