//! Expanding-window fold generation.

use crate::error::{ForecastError, Result};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Configuration for walk-forward evaluation. All spans are calendar days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkForwardConfig {
    /// Days between the first date and the first training cutoff.
    pub initial_window: u32,
    /// Days between successive cutoffs.
    pub fold_period: u32,
    /// Days forecast after each cutoff.
    pub horizon: u32,
    /// Evaluate folds on the rayon thread pool.
    pub parallel: bool,
}

impl Default for WalkForwardConfig {
    fn default() -> Self {
        Self {
            initial_window: 730,
            fold_period: 180,
            horizon: 90,
            parallel: false,
        }
    }
}

impl WalkForwardConfig {
    pub fn new(initial_window: u32, fold_period: u32, horizon: u32) -> Self {
        Self {
            initial_window,
            fold_period,
            horizon,
            parallel: false,
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.fold_period == 0 {
            return Err(ForecastError::InvalidParameter(
                "fold period must be at least one day".to_string(),
            ));
        }
        if self.horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "horizon must be at least one day".to_string(),
            ));
        }
        Ok(())
    }

    /// Span from the first date needed for a single fold.
    pub fn required_span_days(&self) -> i64 {
        i64::from(self.initial_window) + i64::from(self.horizon)
    }
}

/// One train/test split.
///
/// Training rows are dated on or before `training_cutoff`; targets are
/// dated from `horizon_start` through `horizon_end` inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fold {
    pub index: usize,
    pub training_cutoff: NaiveDate,
    pub horizon_start: NaiveDate,
    pub horizon_end: NaiveDate,
}

impl Fold {
    /// Days between the cutoff and `date`.
    pub fn days_ahead(&self, date: NaiveDate) -> i64 {
        (date - self.training_cutoff).num_days()
    }
}

/// Generate folds over `[first, last]`.
///
/// The first cutoff is `first + initial_window`; cutoffs advance by
/// `fold_period` and stop before `cutoff + horizon` passes `last`. A cutoff
/// or horizon end beyond the representable date range ends generation.
pub fn generate_folds(
    first: NaiveDate,
    last: NaiveDate,
    config: &WalkForwardConfig,
) -> Result<Vec<Fold>> {
    config.validate()?;
    let horizon = Days::new(u64::from(config.horizon));
    let step = Days::new(u64::from(config.fold_period));

    let mut folds = Vec::new();
    let mut next = first.checked_add_days(Days::new(u64::from(config.initial_window)));
    while let Some(cutoff) = next {
        let (horizon_start, horizon_end) =
            match (cutoff.succ_opt(), cutoff.checked_add_days(horizon)) {
                (Some(start), Some(end)) if end <= last => (start, end),
                _ => break,
            };
        folds.push(Fold {
            index: folds.len(),
            training_cutoff: cutoff,
            horizon_start,
            horizon_end,
        });
        next = cutoff.checked_add_days(step);
    }
    Ok(folds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day(i: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2013, 1, 1).unwrap() + Duration::days(i)
    }

    #[test]
    fn four_hundred_days_give_three_folds() {
        let config = WalkForwardConfig::new(300, 30, 14);
        let folds = generate_folds(day(0), day(399), &config).unwrap();

        assert_eq!(folds.len(), 3);
        let cutoffs: Vec<_> = folds.iter().map(|f| f.training_cutoff).collect();
        assert_eq!(cutoffs, vec![day(300), day(330), day(360)]);
        assert_eq!(folds[0].horizon_start, day(301));
        assert_eq!(folds[0].horizon_end, day(314));
        assert_eq!(folds[2].index, 2);
    }

    #[test]
    fn fold_may_end_exactly_on_last_date() {
        let config = WalkForwardConfig::new(10, 5, 5);
        let folds = generate_folds(day(0), day(20), &config).unwrap();
        assert_eq!(folds.len(), 2);
        assert_eq!(folds[1].horizon_end, day(20));
    }

    #[test]
    fn short_span_gives_no_folds() {
        let config = WalkForwardConfig::new(300, 30, 14);
        assert!(generate_folds(day(0), day(313), &config).unwrap().is_empty());
        assert_eq!(generate_folds(day(0), day(314), &config).unwrap().len(), 1);
    }

    #[test]
    fn zero_period_or_horizon_is_rejected() {
        assert!(generate_folds(day(0), day(10), &WalkForwardConfig::new(1, 0, 1)).is_err());
        assert!(generate_folds(day(0), day(10), &WalkForwardConfig::new(1, 1, 0)).is_err());
    }

    #[test]
    fn out_of_range_initial_window_gives_no_folds() {
        let config = WalkForwardConfig::new(u32::MAX, 30, 14);
        assert!(generate_folds(day(0), day(399), &config).unwrap().is_empty());
    }

    #[test]
    fn out_of_range_horizon_gives_no_folds() {
        let config = WalkForwardConfig::new(300, 30, u32::MAX);
        assert!(generate_folds(day(0), day(399), &config).unwrap().is_empty());
    }

    #[test]
    fn out_of_range_fold_period_stops_after_first_fold() {
        let config = WalkForwardConfig::new(300, u32::MAX, 14);
        let folds = generate_folds(day(0), day(399), &config).unwrap();
        assert_eq!(folds.len(), 1);
        assert_eq!(folds[0].training_cutoff, day(300));
    }

    #[test]
    fn folds_near_the_end_of_the_calendar_do_not_overflow() {
        let config = WalkForwardConfig::new(1, 1, 1);
        let folds = generate_folds(NaiveDate::MAX - Duration::days(3), NaiveDate::MAX, &config)
            .unwrap();
        assert_eq!(folds.len(), 2);
        assert_eq!(folds[1].horizon_end, NaiveDate::MAX);
    }

    #[test]
    fn defaults_match_two_year_window() {
        let config = WalkForwardConfig::default();
        assert_eq!(config.initial_window, 730);
        assert_eq!(config.fold_period, 180);
        assert_eq!(config.horizon, 90);
        assert_eq!(config.required_span_days(), 820);
    }
}
