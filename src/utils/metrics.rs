//! Point-error metrics for forecast evaluation.

use crate::error::{ForecastError, Result};

/// Point-error metrics over a set of (actual, predicted) pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Number of scored points
    pub n_points: usize,
}

/// Running sums of residuals.
///
/// Walk-forward evaluation builds one accumulator per fold, possibly on
/// different threads, and merges them in fold order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResidualSums {
    n: usize,
    abs_sum: f64,
    sq_sum: f64,
}

impl ResidualSums {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, actual: f64, predicted: f64) {
        let residual = actual - predicted;
        self.n += 1;
        self.abs_sum += residual.abs();
        self.sq_sum += residual * residual;
    }

    pub fn merge(&mut self, other: &ResidualSums) {
        self.n += other.n;
        self.abs_sum += other.abs_sum;
        self.sq_sum += other.sq_sum;
    }

    /// Metrics over everything pushed so far; `None` when empty.
    pub fn metrics(&self) -> Option<ErrorMetrics> {
        if self.n == 0 {
            return None;
        }
        let n = self.n as f64;
        let mse = self.sq_sum / n;
        Some(ErrorMetrics {
            mae: self.abs_sum / n,
            mse,
            rmse: mse.sqrt(),
            n_points: self.n,
        })
    }
}

/// Calculate error metrics between actual and predicted values.
pub fn calculate_metrics(actual: &[f64], predicted: &[f64]) -> Result<ErrorMetrics> {
    if actual.is_empty() || predicted.is_empty() {
        return Err(ForecastError::EmptyData);
    }

    if actual.len() != predicted.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: actual.len(),
            got: predicted.len(),
        });
    }

    let mut sums = ResidualSums::new();
    for (a, p) in actual.iter().zip(predicted.iter()) {
        sums.push(*a, *p);
    }
    sums.metrics().ok_or(ForecastError::EmptyData)
}

/// Mean Absolute Percentage Error, in percent. `None` if any actual is zero.
pub fn mape(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    if actual.is_empty() || actual.len() != predicted.len() || actual.contains(&0.0) {
        return None;
    }
    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| ((a - p) / a).abs())
        .sum();
    Some(100.0 * sum / actual.len() as f64)
}

/// Symmetric Mean Absolute Percentage Error, in percent (0 to 200).
pub fn smape(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() || actual.len() != predicted.len() {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| {
            let denom = a.abs() + p.abs();
            if denom == 0.0 {
                0.0
            } else {
                2.0 * (a - p).abs() / denom
            }
        })
        .sum::<f64>()
        * 100.0
        / actual.len() as f64
}
