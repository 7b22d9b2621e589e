//! In-sample fit diagnostics.
//!
//! These numbers describe how well a model reproduces the data it was fitted
//! on. They are optimistic by construction and kept in their own type so
//! they are never reported as forecast accuracy.

use crate::core::DailySeries;
use crate::error::Result;
use crate::models::{validate_forecast, ForecastModel};
use crate::utils::calculate_metrics;
use serde::Serialize;
use tracing::info;

/// Fit quality of a model on its own training data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InSampleMetrics {
    pub mae: f64,
    pub rmse: f64,
    pub n_points: usize,
}

/// Fit `model` on the full `series` and score its fitted values.
pub fn in_sample_metrics<M: ForecastModel>(
    model: &mut M,
    series: &DailySeries,
) -> Result<InSampleMetrics> {
    model.fit(series)?;
    let rows = model.predict(series.dates())?;
    validate_forecast(series.dates(), &rows)?;

    let fitted: Vec<f64> = rows.iter().map(|r| r.yhat).collect();
    let metrics = calculate_metrics(series.values(), &fitted)?;
    info!(
        model = model.name(),
        mae = metrics.mae,
        rmse = metrics.rmse,
        "in-sample fit (not out-of-sample accuracy)"
    );
    Ok(InSampleMetrics {
        mae: metrics.mae,
        rmse: metrics.rmse,
        n_points: metrics.n_points,
    })
}
