//! Forecast rows and the finalized forecast table.

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One forecast date with its uncertainty band and optional components.
///
/// Field names are the persisted column set of `forecast_results.csv`;
/// adding fields is compatible, renaming or removing them is not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
    pub trend: Option<f64>,
    pub yearly: Option<f64>,
    pub weekly: Option<f64>,
}

impl ForecastRow {
    /// A row with a point forecast and interval but no components.
    pub fn new(date: NaiveDate, yhat: f64, yhat_lower: f64, yhat_upper: f64) -> Self {
        Self {
            date,
            yhat,
            yhat_lower,
            yhat_upper,
            trend: None,
            yearly: None,
            weekly: None,
        }
    }

    pub fn with_components(
        mut self,
        trend: Option<f64>,
        yearly: Option<f64>,
        weekly: Option<f64>,
    ) -> Self {
        self.trend = trend;
        self.yearly = yearly;
        self.weekly = weekly;
        self
    }

    /// Check `yhat_lower <= yhat <= yhat_upper`. NaN fails the check.
    pub fn validate_bounds(&self) -> Result<()> {
        if self.yhat_lower <= self.yhat && self.yhat <= self.yhat_upper {
            Ok(())
        } else {
            Err(ForecastError::InvalidBounds {
                date: self.date,
                lower: self.yhat_lower,
                yhat: self.yhat,
                upper: self.yhat_upper,
            })
        }
    }

    pub fn contains(&self, actual: f64) -> bool {
        self.yhat_lower <= actual && actual <= self.yhat_upper
    }
}

/// Validated forecast output handed to renderers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForecastTable {
    rows: Vec<ForecastRow>,
}

impl ForecastTable {
    /// Wrap rows after checking bounds and strict date order.
    pub fn new(rows: Vec<ForecastRow>) -> Result<Self> {
        for row in &rows {
            row.validate_bounds()?;
        }
        for pair in rows.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(ForecastError::InvalidParameter(format!(
                    "forecast dates must be strictly increasing ({} follows {})",
                    pair[1].date, pair[0].date
                )));
            }
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows with `start <= date <= end`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> &[ForecastRow] {
        let lo = self.rows.partition_point(|r| r.date < start);
        let hi = self.rows.partition_point(|r| r.date <= end).max(lo);
        &self.rows[lo..hi]
    }

    /// Rows dated after `date`.
    pub fn after(&self, date: NaiveDate) -> &[ForecastRow] {
        let lo = self.rows.partition_point(|r| r.date <= date);
        &self.rows[lo..]
    }

    pub fn into_rows(self) -> Vec<ForecastRow> {
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 8, d).unwrap()
    }

    #[test]
    fn bounds_validation_catches_inverted_and_nan_rows() {
        assert!(ForecastRow::new(date(1), 5.0, 4.0, 6.0).validate_bounds().is_ok());
        assert!(ForecastRow::new(date(1), 5.0, 5.0, 5.0).validate_bounds().is_ok());
        assert!(matches!(
            ForecastRow::new(date(1), 7.0, 4.0, 6.0).validate_bounds(),
            Err(ForecastError::InvalidBounds { .. })
        ));
        assert!(ForecastRow::new(date(1), f64::NAN, 4.0, 6.0)
            .validate_bounds()
            .is_err());
    }

    #[test]
    fn table_filters_by_date_range() {
        let table = ForecastTable::new(
            (1..=5)
                .map(|d| ForecastRow::new(date(d), d as f64, 0.0, 10.0))
                .collect(),
        )
        .unwrap();

        let window = table.between(date(2), date(4));
        assert_eq!(window.len(), 3);
        assert_eq!(window[0].date, date(2));
        assert_eq!(table.after(date(3)).len(), 2);
        assert!(table.between(date(9), date(10)).is_empty());
    }

    #[test]
    fn table_rejects_unordered_rows() {
        let rows = vec![
            ForecastRow::new(date(2), 1.0, 0.0, 2.0),
            ForecastRow::new(date(1), 1.0, 0.0, 2.0),
        ];
        assert!(ForecastTable::new(rows).is_err());
    }

    #[test]
    fn components_are_optional() {
        let row = ForecastRow::new(date(1), 3.0, 2.0, 4.0).with_components(Some(3.0), None, Some(0.1));
        assert_eq!(row.trend, Some(3.0));
        assert_eq!(row.yearly, None);
        assert!(row.contains(2.5));
        assert!(!row.contains(4.5));
    }
}
