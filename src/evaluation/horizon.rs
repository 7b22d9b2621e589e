//! Error metrics grouped by how far ahead of the cutoff a forecast was made.

use crate::utils::{calculate_metrics, mape, smape};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// One scored forecast inside a fold's horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FoldPoint {
    pub date: NaiveDate,
    /// Days after the fold's training cutoff (1 for the first horizon day).
    pub days_ahead: i64,
    pub actual: f64,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

impl FoldPoint {
    pub fn residual(&self) -> f64 {
        self.actual - self.yhat
    }

    pub fn covered(&self) -> bool {
        self.yhat_lower <= self.actual && self.actual <= self.yhat_upper
    }
}

/// Metrics for every point forecast the same number of days ahead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HorizonMetrics {
    pub days_ahead: i64,
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    /// Absent when any actual at this horizon is zero.
    pub mape: Option<f64>,
    pub smape: f64,
    /// Share of actuals inside the forecast band.
    pub coverage: f64,
    pub n_points: usize,
}

/// Group points by days ahead and score each group.
pub fn horizon_metrics<'a, I>(points: I) -> Vec<HorizonMetrics>
where
    I: IntoIterator<Item = &'a FoldPoint>,
{
    let mut by_horizon: BTreeMap<i64, Vec<&FoldPoint>> = BTreeMap::new();
    for point in points {
        by_horizon.entry(point.days_ahead).or_default().push(point);
    }

    by_horizon
        .into_iter()
        .filter_map(|(days_ahead, group)| {
            let actual: Vec<f64> = group.iter().map(|p| p.actual).collect();
            let predicted: Vec<f64> = group.iter().map(|p| p.yhat).collect();
            let metrics = calculate_metrics(&actual, &predicted).ok()?;
            let covered = group.iter().filter(|p| p.covered()).count();
            Some(HorizonMetrics {
                days_ahead,
                mse: metrics.mse,
                rmse: metrics.rmse,
                mae: metrics.mae,
                mape: mape(&actual, &predicted),
                smape: smape(&actual, &predicted),
                coverage: covered as f64 / group.len() as f64,
                n_points: group.len(),
            })
        })
        .collect()
}
