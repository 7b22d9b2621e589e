//! The forecast model contract shared by evaluation and production forecasting.

use crate::core::{DailySeries, ForecastRow};
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;

/// Common interface for daily-series forecasting models.
///
/// A model is fitted once and then queried for arbitrary dates, in-sample
/// or future. Evaluation never re-fits an instance: each fold builds a new
/// one through a factory.
pub trait ForecastModel {
    /// Fit the model to a daily history.
    ///
    /// Implementations fail with [`ForecastError::InsufficientData`] when
    /// the history holds fewer than two dates.
    fn fit(&mut self, history: &DailySeries) -> Result<()>;

    /// Predict one row per requested date, in request order.
    fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<ForecastRow>>;

    /// Get the model name.
    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool;
}

/// Type alias for boxed model trait objects.
pub type BoxedModel = Box<dyn ForecastModel + Send>;

impl<M: ForecastModel + ?Sized> ForecastModel for Box<M> {
    fn fit(&mut self, history: &DailySeries) -> Result<()> {
        (**self).fit(history)
    }

    fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<ForecastRow>> {
        (**self).predict(dates)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_fitted(&self) -> bool {
        (**self).is_fitted()
    }
}

/// Minimum history a model needs before it can be fitted.
pub(crate) fn require_history(history: &DailySeries) -> Result<()> {
    if history.len() < 2 {
        return Err(ForecastError::InsufficientData {
            needed: 2,
            got: history.len(),
        });
    }
    Ok(())
}

/// Check a model's output against the request: same length, same dates in
/// the same order, and `yhat_lower <= yhat <= yhat_upper` on every row.
pub fn validate_forecast(requested: &[NaiveDate], rows: &[ForecastRow]) -> Result<()> {
    if rows.len() != requested.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: requested.len(),
            got: rows.len(),
        });
    }
    for (expected, row) in requested.iter().zip(rows) {
        if row.date != *expected {
            return Err(ForecastError::DateMismatch {
                expected: *expected,
                got: row.date,
            });
        }
        row.validate_bounds()?;
    }
    Ok(())
}
