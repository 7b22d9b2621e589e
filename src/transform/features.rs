//! Grouped temporal feature engineering.
//!
//! Each series group is sorted (or verified sorted), then scanned once to
//! derive calendar, lag and trailing-mean columns. Groups never see each
//! other's rows and no column at date `t` reads a row dated after `t`.

use super::calendar::CalendarFeatures;
use super::window::{lag, rolling_mean};
use crate::core::{Observation, SeriesGroup, SeriesKey};
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// What to do with a group whose dates are out of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderPolicy {
    /// Fail with [`ForecastError::UnsortedInput`].
    Strict,
    /// Sort the group by date and log the violation.
    #[default]
    SortDefensively,
}

/// Lag and window sizes to derive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub lags: Vec<usize>,
    pub windows: Vec<usize>,
    pub order: OrderPolicy,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            lags: vec![1, 7],
            windows: vec![7, 30],
            order: OrderPolicy::SortDefensively,
        }
    }
}

impl FeatureConfig {
    pub fn with_lags(mut self, lags: Vec<usize>) -> Self {
        self.lags = lags;
        self
    }

    pub fn with_windows(mut self, windows: Vec<usize>) -> Self {
        self.windows = windows;
        self
    }

    pub fn with_order(mut self, order: OrderPolicy) -> Self {
        self.order = order;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.lags.contains(&0) {
            return Err(ForecastError::InvalidParameter(
                "lag sizes must be at least 1".to_string(),
            ));
        }
        if self.windows.contains(&0) {
            return Err(ForecastError::InvalidParameter(
                "rolling window sizes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// An observation extended with derived feature columns.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    observation: Observation,
    calendar: CalendarFeatures,
    lags: Vec<(usize, Option<f64>)>,
    rolling: Vec<(usize, f64)>,
}

impl FeatureRow {
    pub fn observation(&self) -> &Observation {
        &self.observation
    }

    pub fn calendar(&self) -> &CalendarFeatures {
        &self.calendar
    }

    /// `sales` value `k` rows earlier in the same series; `None` when the
    /// series is shorter than that or `k` was not configured.
    pub fn lag(&self, k: usize) -> Option<f64> {
        self.lags
            .iter()
            .find(|(size, _)| *size == k)
            .and_then(|(_, value)| *value)
    }

    /// Trailing mean of `sales` over `window` rows; `None` only when the
    /// window was not configured.
    pub fn rolling_mean(&self, window: usize) -> Option<f64> {
        self.rolling
            .iter()
            .find(|(size, _)| *size == window)
            .map(|(_, value)| *value)
    }

    pub fn lags(&self) -> &[(usize, Option<f64>)] {
        &self.lags
    }

    pub fn rolling_means(&self) -> &[(usize, f64)] {
        &self.rolling
    }
}

/// Feature rows for every series, grouped by key and chronological within a key.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureTable {
    lags: Vec<usize>,
    windows: Vec<usize>,
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn lags(&self) -> &[usize] {
        &self.lags
    }

    pub fn windows(&self) -> &[usize] {
        &self.windows
    }

    /// Rows of one series.
    pub fn rows_for<'a>(&'a self, key: &'a SeriesKey) -> impl Iterator<Item = &'a FeatureRow> {
        self.rows.iter().filter(move |r| r.observation.key() == key)
    }

    /// The underlying observations, for aggregation.
    pub fn observations(&self) -> impl Iterator<Item = &Observation> {
        self.rows.iter().map(|r| &r.observation)
    }

    /// Derived column names in output order.
    pub fn feature_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = ["year", "month", "day", "day_of_week", "is_weekend"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        columns.extend(self.lags.iter().map(|k| format!("sales_lag_{}", k)));
        columns.extend(self.windows.iter().map(|w| format!("sales_rolling_{}", w)));
        columns
    }
}

/// Derives calendar, lag and rolling features per series group.
#[derive(Debug, Clone, Default)]
pub struct FeatureTransformer {
    config: FeatureConfig,
}

impl FeatureTransformer {
    pub fn new(config: FeatureConfig) -> Result<Self> {
        config.validate()?;
        let mut config = config;
        config.lags.sort_unstable();
        config.lags.dedup();
        config.windows.sort_unstable();
        config.windows.dedup();
        Ok(Self { config })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Transform every group into feature rows.
    ///
    /// Fails with [`ForecastError::MalformedSeries`] on a duplicate date
    /// within a group, and with [`ForecastError::UnsortedInput`] on
    /// out-of-order dates under [`OrderPolicy::Strict`].
    pub fn transform<I>(&self, groups: I) -> Result<FeatureTable>
    where
        I: IntoIterator<Item = SeriesGroup>,
    {
        let mut rows = Vec::new();
        for group in groups {
            self.transform_group(group, &mut rows)?;
        }
        Ok(FeatureTable {
            lags: self.config.lags.clone(),
            windows: self.config.windows.clone(),
            rows,
        })
    }

    fn transform_group(&self, group: SeriesGroup, out: &mut Vec<FeatureRow>) -> Result<()> {
        let (key, mut observations) = group.into_parts();

        if let Some(position) = first_out_of_order(&observations) {
            match self.config.order {
                OrderPolicy::Strict => {
                    return Err(ForecastError::UnsortedInput {
                        key: key.to_string(),
                        position,
                    });
                }
                OrderPolicy::SortDefensively => {
                    warn!(
                        series = %key,
                        position,
                        "series group not in date order; sorting before feature derivation"
                    );
                    observations.sort_by_key(|o| o.date());
                }
            }
        }

        if let Some(dup) = observations.windows(2).find(|w| w[0].date() == w[1].date()) {
            return Err(ForecastError::MalformedSeries {
                key: key.to_string(),
                date: dup[1].date(),
            });
        }

        let sales: Vec<f64> = observations.iter().map(|o| o.sales()).collect();
        let lag_columns: Vec<(usize, Vec<Option<f64>>)> = self
            .config
            .lags
            .iter()
            .map(|&k| (k, lag(&sales, k)))
            .collect();
        let rolling_columns: Vec<(usize, Vec<f64>)> = self
            .config
            .windows
            .iter()
            .map(|&w| (w, rolling_mean(&sales, w)))
            .collect();

        out.reserve(observations.len());
        for (i, observation) in observations.into_iter().enumerate() {
            out.push(FeatureRow {
                calendar: CalendarFeatures::from_date(observation.date()),
                lags: lag_columns.iter().map(|(k, col)| (*k, col[i])).collect(),
                rolling: rolling_columns.iter().map(|(w, col)| (*w, col[i])).collect(),
                observation,
            });
        }
        Ok(())
    }
}

/// Index of the first observation dated before its predecessor.
fn first_out_of_order(observations: &[Observation]) -> Option<usize> {
    observations
        .windows(2)
        .position(|w| w[1].date() < w[0].date())
        .map(|i| i + 1)
}
