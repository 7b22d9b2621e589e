//! Collapse per-series observations into one system-wide daily series.

use crate::core::{DailySeries, Observation, SeriesStore};
use crate::error::Result;
use std::cmp::Ordering;

/// Sum sales across all series for each date present in the input.
///
/// Dates whose total is zero are kept. Rows are put in a canonical order
/// (date, series key, sales) before summation, so any permutation of the
/// same input yields a bit-identical series.
pub fn aggregate<'a, I>(rows: I) -> Result<DailySeries>
where
    I: IntoIterator<Item = &'a Observation>,
{
    let mut rows: Vec<&Observation> = rows.into_iter().collect();
    rows.sort_by(|a, b| canonical_order(a, b));

    let mut pairs: Vec<(chrono::NaiveDate, f64)> = Vec::new();
    for obs in rows {
        match pairs.last_mut() {
            Some((date, total)) if *date == obs.date() => *total += obs.sales(),
            _ => pairs.push((obs.date(), obs.sales())),
        }
    }
    DailySeries::from_pairs(pairs)
}

/// Aggregate every observation held by a store.
pub fn aggregate_store(store: &SeriesStore) -> Result<DailySeries> {
    aggregate(store.observations())
}

fn canonical_order(a: &Observation, b: &Observation) -> Ordering {
    a.date()
        .cmp(&b.date())
        .then_with(|| a.key().cmp(b.key()))
        .then_with(|| a.sales().total_cmp(&b.sales()))
}
