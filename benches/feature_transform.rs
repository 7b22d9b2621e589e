//! Benchmarks for feature derivation and aggregation.
//!
//! Time per row should stay flat as the series grow: the rolling means are
//! a single running-sum pass per group.

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use store_sales_forecast::core::{Observation, SeriesKey, SeriesStore};
use store_sales_forecast::transform::{aggregate_store, FeatureConfig, FeatureTransformer};

fn generate_store(series: usize, days: usize) -> SeriesStore {
    let start = NaiveDate::from_ymd_opt(2013, 1, 1).unwrap();
    let rows = (0..series).flat_map(|s| {
        let key = SeriesKey::new((s / 4).to_string(), format!("FAMILY_{}", s % 4));
        (0..days).map(move |d| {
            let sales = 10.0 + ((s * 31 + d * 7) % 50) as f64;
            Observation::new(key.clone(), start + Duration::days(d as i64), sales, 0).unwrap()
        })
    });
    SeriesStore::from_observations(rows).unwrap()
}

fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("feature_transform");
    let transformer = FeatureTransformer::new(
        FeatureConfig::default()
            .with_lags(vec![1, 7, 14])
            .with_windows(vec![7, 30, 365]),
    )
    .unwrap();

    for days in [365, 730, 1460, 2920] {
        let store = generate_store(16, days);
        group.throughput(Throughput::Elements(store.len() as u64));
        group.bench_with_input(BenchmarkId::new("transform", days), &store, |b, store| {
            b.iter(|| black_box(transformer.transform(store.groups()).unwrap()))
        });
    }
    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");

    for series in [8, 32, 128] {
        let store = generate_store(series, 730);
        group.throughput(Throughput::Elements(store.len() as u64));
        group.bench_with_input(BenchmarkId::new("aggregate_store", series), &store, |b, store| {
            b.iter(|| black_box(aggregate_store(store).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_transform, bench_aggregate);
criterion_main!(benches);
