//! System-wide daily sales series, the input contract of forecast models.

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;

/// Total sales per calendar date, strictly increasing by date.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DailySeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl DailySeries {
    /// Create a series, validating lengths and strict date order.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: dates.len(),
                got: values.len(),
            });
        }
        for i in 1..dates.len() {
            if dates[i] <= dates[i - 1] {
                return Err(ForecastError::InvalidParameter(format!(
                    "daily series dates must be strictly increasing ({} follows {})",
                    dates[i],
                    dates[i - 1]
                )));
            }
        }
        Ok(Self { dates, values })
    }

    /// Create a series from (date, total) pairs already in date order.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let (dates, values) = pairs.into_iter().unzip();
        Self::new(dates, values)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Total for a date, if present.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.dates
            .binary_search(&date)
            .ok()
            .map(|i| self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Rows dated on or before `cutoff`.
    pub fn up_to(&self, cutoff: NaiveDate) -> DailySeries {
        let end = self.dates.partition_point(|d| *d <= cutoff);
        self.slice(0, end)
    }

    /// Rows with `start <= date <= end`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> DailySeries {
        let lo = self.dates.partition_point(|d| *d < start);
        let hi = self.dates.partition_point(|d| *d <= end).max(lo);
        self.slice(lo, hi)
    }

    fn slice(&self, start: usize, end: usize) -> DailySeries {
        DailySeries {
            dates: self.dates[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2016, 2, d).unwrap()
    }

    fn series() -> DailySeries {
        DailySeries::new(
            vec![date(1), date(2), date(4), date(5)],
            vec![1.0, 2.0, 4.0, 5.0],
        )
        .unwrap()
    }

    #[test]
    fn rejects_unordered_or_duplicate_dates() {
        assert!(DailySeries::new(vec![date(2), date(1)], vec![1.0, 2.0]).is_err());
        assert!(DailySeries::new(vec![date(1), date(1)], vec![1.0, 2.0]).is_err());
        assert!(matches!(
            DailySeries::new(vec![date(1)], vec![1.0, 2.0]),
            Err(ForecastError::DimensionMismatch { expected: 1, got: 2 })
        ));
    }

    #[test]
    fn up_to_is_inclusive() {
        let s = series();
        assert_eq!(s.up_to(date(2)).values(), &[1.0, 2.0]);
        assert_eq!(s.up_to(date(3)).values(), &[1.0, 2.0]);
        assert!(s.up_to(NaiveDate::from_ymd_opt(2016, 1, 1).unwrap()).is_empty());
    }

    #[test]
    fn between_skips_gaps() {
        let s = series();
        let window = s.between(date(2), date(4));
        assert_eq!(window.dates(), &[date(2), date(4)]);
        assert!(s.between(date(6), date(3)).is_empty());
    }

    #[test]
    fn lookup_by_date() {
        let s = series();
        assert_eq!(s.get(date(4)), Some(4.0));
        assert_eq!(s.get(date(3)), None);
        assert_eq!(s.first_date(), Some(date(1)));
        assert_eq!(s.last_date(), Some(date(5)));
    }
}
