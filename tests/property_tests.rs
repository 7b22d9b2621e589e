//! Property-based tests for features, aggregation, folds and forecasts.
//!
//! These tests verify invariants that should hold for all valid inputs,
//! using randomly generated series.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use store_sales_forecast::core::{DailySeries, Observation, SeriesGroup, SeriesKey};
use store_sales_forecast::evaluation::{generate_folds, WalkForwardConfig};
use store_sales_forecast::models::{
    validate_forecast, ForecastModel, Naive, SeasonalTrend, SeasonalTrendConfig,
};
use store_sales_forecast::transform::{aggregate, FeatureConfig, FeatureTransformer};

fn day(i: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 1, 1).unwrap() + Duration::days(i)
}

fn group(sales: &[f64]) -> SeriesGroup {
    let key = SeriesKey::new("1", "GROCERY I");
    let rows = sales
        .iter()
        .enumerate()
        .map(|(i, &s)| Observation::new(key.clone(), day(i as i64), s, 0).unwrap())
        .collect();
    SeriesGroup::new(key, rows).unwrap()
}

fn transformer() -> FeatureTransformer {
    FeatureTransformer::new(
        FeatureConfig::default()
            .with_lags(vec![1, 3, 7])
            .with_windows(vec![1, 4, 7]),
    )
    .unwrap()
}

/// Strategy for generating non-negative sales values.
fn sales_strategy(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0..1000.0_f64, min_len..max_len)
}

/// Integer-valued rows across a few stores and days, so sums are exact.
fn rows_strategy() -> impl Strategy<Value = Vec<Observation>> {
    prop::collection::vec((0u8..4, 0u8..3, 0i64..15, 0u32..500), 1..60).prop_map(|rows| {
        rows.into_iter()
            .map(|(store, family, d, sales)| {
                Observation::new(
                    SeriesKey::new(store.to_string(), format!("F{}", family)),
                    day(d),
                    f64::from(sales),
                    0,
                )
                .unwrap()
            })
            .collect()
    })
}

// =============================================================================
// Property: No look-ahead in lag and rolling features
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn lags_read_only_earlier_rows(sales in sales_strategy(1, 60)) {
        let table = transformer().transform(vec![group(&sales)]).unwrap();
        for (i, row) in table.rows().iter().enumerate() {
            for k in [1usize, 3, 7] {
                let expected = if i >= k { Some(sales[i - k]) } else { None };
                prop_assert_eq!(row.lag(k), expected);
            }
        }
    }

    #[test]
    fn rolling_mean_matches_trailing_window(sales in sales_strategy(1, 60)) {
        let table = transformer().transform(vec![group(&sales)]).unwrap();
        for (i, row) in table.rows().iter().enumerate() {
            for w in [1usize, 4, 7] {
                let start = (i + 1).saturating_sub(w);
                let window = &sales[start..=i];
                let expected = window.iter().sum::<f64>() / window.len() as f64;
                let got = row.rolling_mean(w).unwrap();
                prop_assert!((got - expected).abs() <= 1e-9 * expected.abs().max(1.0),
                    "index {} window {}: {} vs {}", i, w, got, expected);
            }
        }
    }

    #[test]
    fn features_of_a_prefix_equal_prefix_of_features(
        sales in sales_strategy(2, 60),
        cut in 0usize..60
    ) {
        let cut = cut % sales.len();
        let full = transformer().transform(vec![group(&sales)]).unwrap();
        let truncated = group(&sales).truncated_to(day(cut as i64));
        let prefix = transformer().transform(vec![truncated]).unwrap();

        prop_assert_eq!(prefix.len(), cut + 1);
        for (a, b) in prefix.rows().iter().zip(full.rows()) {
            prop_assert_eq!(a.lags(), b.lags());
            prop_assert_eq!(a.rolling_means(), b.rolling_means());
        }
    }
}

// =============================================================================
// Property: Aggregation is order- and partition-independent
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn aggregation_ignores_row_order(
        (rows, shuffled) in rows_strategy()
            .prop_flat_map(|rows| (Just(rows.clone()), Just(rows).prop_shuffle()))
    ) {
        prop_assert_eq!(aggregate(&rows).unwrap(), aggregate(&shuffled).unwrap());
    }

    #[test]
    fn aggregation_of_partitions_sums_to_whole(rows in rows_strategy(), split in 0usize..60) {
        let split = split % (rows.len() + 1);
        let whole = aggregate(&rows).unwrap();
        let left = aggregate(&rows[..split]).unwrap();
        let right = aggregate(&rows[split..]).unwrap();

        for (date, total) in whole.iter() {
            let merged = left.get(date).unwrap_or(0.0) + right.get(date).unwrap_or(0.0);
            prop_assert_eq!(total, merged);
        }
        prop_assert!(left.len() <= whole.len() && right.len() <= whole.len());
    }
}

// =============================================================================
// Property: Folds are ordered and stay inside the data
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn folds_are_increasing_and_bounded(
        span in 1i64..800,
        initial_window in 0u32..400,
        fold_period in 1u32..90,
        horizon in 1u32..60
    ) {
        let config = WalkForwardConfig::new(initial_window, fold_period, horizon);
        let folds = generate_folds(day(0), day(span), &config).unwrap();

        for pair in folds.windows(2) {
            prop_assert!(pair[0].training_cutoff < pair[1].training_cutoff);
        }
        for fold in &folds {
            prop_assert_eq!(fold.horizon_start, fold.training_cutoff + Duration::days(1));
            prop_assert!(fold.horizon_end <= day(span));
            prop_assert!(fold.training_cutoff >= day(i64::from(initial_window)));
        }
    }
}

// =============================================================================
// Property: Forecast intervals are properly ordered (lower <= point <= upper)
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn naive_bounds_are_ordered(sales in sales_strategy(2, 120), ahead in 1i64..60) {
        let history = DailySeries::new(
            (0..sales.len() as i64).map(day).collect(),
            sales.clone(),
        ).unwrap();
        let dates: Vec<NaiveDate> = (0..sales.len() as i64 + ahead).map(day).collect();
        let mut model = Naive::new();
        model.fit(&history).unwrap();
        let rows = model.predict(&dates).unwrap();
        prop_assert!(validate_forecast(&dates, &rows).is_ok());
    }

    #[test]
    fn seasonal_trend_bounds_are_ordered(
        sales in prop::collection::vec(1.0..1000.0_f64, 14..400),
        ahead in 1i64..90,
        additive in any::<bool>()
    ) {
        let history = DailySeries::new(
            (0..sales.len() as i64).map(day).collect(),
            sales.clone(),
        ).unwrap();
        let dates: Vec<NaiveDate> = (0..sales.len() as i64 + ahead).map(day).collect();
        let config = if additive {
            SeasonalTrendConfig::additive()
        } else {
            SeasonalTrendConfig::default()
        };
        let mut model = SeasonalTrend::new(config);
        model.fit(&history).unwrap();
        let rows = model.predict(&dates).unwrap();
        for row in &rows {
            prop_assert!(row.yhat.is_finite());
        }
        prop_assert!(validate_forecast(&dates, &rows).is_ok());
    }
}
