//! Naive forecasting model.
//!
//! Forecasts the most recent value observed before each requested date.

use crate::core::{DailySeries, ForecastRow};
use crate::error::{ForecastError, Result};
use crate::models::traits::{require_history, ForecastModel};
use crate::utils::{interval_z, rms};
use chrono::NaiveDate;

/// Naive forecaster that repeats the last value.
#[derive(Debug, Clone)]
pub struct Naive {
    interval_width: f64,
    history: Option<DailySeries>,
    sigma: f64,
}

impl Default for Naive {
    fn default() -> Self {
        Self {
            interval_width: 0.8,
            history: None,
            sigma: 0.0,
        }
    }
}

impl Naive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the central coverage of the uncertainty band (0 < width < 1).
    pub fn with_interval_width(mut self, width: f64) -> Self {
        self.interval_width = width;
        self
    }
}

impl ForecastModel for Naive {
    fn fit(&mut self, history: &DailySeries) -> Result<()> {
        require_history(history)?;
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "interval width must be in (0, 1), got {}",
                self.interval_width
            )));
        }

        // Residuals of the one-step naive forecast are first differences.
        let diffs: Vec<f64> = history.values().windows(2).map(|w| w[1] - w[0]).collect();
        self.sigma = rms(&diffs);
        self.history = Some(history.clone());
        Ok(())
    }

    fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<ForecastRow>> {
        let history = self.history.as_ref().ok_or(ForecastError::FitRequired)?;
        let values = history.values();
        let last_date = history.last_date().ok_or(ForecastError::FitRequired)?;
        let z = interval_z(self.interval_width);

        Ok(dates
            .iter()
            .map(|&date| {
                // Last value strictly before the date, or the first value.
                let idx = history.dates().partition_point(|d| *d < date);
                let yhat = values[idx.saturating_sub(1)];
                // Band widens with the square root of the steps ahead.
                let steps = (date - last_date).num_days().max(1) as f64;
                let half = z * self.sigma * steps.sqrt();
                ForecastRow::new(date, yhat, yhat - half, yhat + half)
            })
            .collect())
    }

    fn name(&self) -> &str {
        "Naive"
    }

    fn is_fitted(&self) -> bool {
        self.history.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::traits::validate_forecast;
    use approx::assert_relative_eq;
    use chrono::Duration;

    fn day(i: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(i)
    }

    fn series(values: &[f64]) -> DailySeries {
        DailySeries::new((0..values.len() as i64).map(day).collect(), values.to_vec()).unwrap()
    }

    #[test]
    fn naive_repeats_last_value() {
        let mut model = Naive::new();
        model.fit(&series(&[1.0, 2.0, 3.0, 4.0, 5.0])).unwrap();

        let dates: Vec<_> = (5..8).map(day).collect();
        let rows = model.predict(&dates).unwrap();
        let yhat: Vec<f64> = rows.iter().map(|r| r.yhat).collect();
        assert_eq!(yhat, vec![5.0, 5.0, 5.0]);
    }

    #[test]
    fn naive_in_sample_uses_previous_value() {
        let mut model = Naive::new();
        model.fit(&series(&[1.0, 3.0, 6.0])).unwrap();

        let dates: Vec<_> = (0..3).map(day).collect();
        let yhat: Vec<f64> = model.predict(&dates).unwrap().iter().map(|r| r.yhat).collect();
        assert_eq!(yhat, vec![1.0, 1.0, 3.0]);
    }

    #[test]
    fn naive_confidence_intervals_widen_with_horizon() {
        let values: Vec<f64> = (0..10).map(|i| (i as f64) + 0.1 * (i as f64).sin()).collect();
        let mut model = Naive::new();
        model.fit(&series(&values)).unwrap();

        let dates: Vec<_> = (10..15).map(day).collect();
        let rows = model.predict(&dates).unwrap();
        validate_forecast(&dates, &rows).unwrap();

        let widths: Vec<f64> = rows.iter().map(|r| r.yhat_upper - r.yhat_lower).collect();
        for pair in widths.windows(2) {
            assert!(pair[1] > pair[0]);
        }
        assert_relative_eq!(widths[3] / widths[0], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn naive_requires_two_points_and_fit() {
        let mut model = Naive::new();
        assert_eq!(model.predict(&[day(0)]), Err(ForecastError::FitRequired));
        assert_eq!(
            model.fit(&series(&[1.0])),
            Err(ForecastError::InsufficientData { needed: 2, got: 1 })
        );
    }

    #[test]
    fn naive_rejects_bad_interval_width() {
        let mut model = Naive::new().with_interval_width(1.5);
        assert!(matches!(
            model.fit(&series(&[1.0, 2.0])),
            Err(ForecastError::InvalidParameter(_))
        ));
    }
}
