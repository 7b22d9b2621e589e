//! Trend plus calendar-seasonality decomposition model.
//!
//! Fits a least-squares linear trend on the day index, then estimates a
//! day-of-week effect and a month-of-year effect from the detrended
//! history. Effects combine with the trend additively or multiplicatively.
//! The uncertainty band is the in-sample residual scale, widened for dates
//! beyond the history.

use crate::core::{DailySeries, ForecastRow};
use crate::error::{ForecastError, Result};
use crate::models::traits::{require_history, ForecastModel};
use crate::utils::{interval_z, linear_fit, rms};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Trend values closer to zero than this are skipped when estimating
/// multiplicative effects.
const TREND_EPSILON: f64 = 1e-9;

/// Minimum history span, in days, before a yearly effect is estimated.
const MIN_YEARLY_SPAN_DAYS: i64 = 365;

/// How seasonal effects combine with the trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalityMode {
    /// `yhat = trend + weekly + yearly`
    Additive,
    /// `yhat = trend * (1 + weekly + yearly)`
    #[default]
    Multiplicative,
}

/// Configuration for [`SeasonalTrend`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonalTrendConfig {
    pub mode: SeasonalityMode,
    pub weekly: bool,
    pub yearly: bool,
    /// Central coverage of the uncertainty band.
    pub interval_width: f64,
}

impl Default for SeasonalTrendConfig {
    fn default() -> Self {
        Self {
            mode: SeasonalityMode::Multiplicative,
            weekly: true,
            yearly: true,
            interval_width: 0.8,
        }
    }
}

impl SeasonalTrendConfig {
    pub fn additive() -> Self {
        Self {
            mode: SeasonalityMode::Additive,
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: SeasonalityMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_weekly(mut self, weekly: bool) -> Self {
        self.weekly = weekly;
        self
    }

    pub fn with_yearly(mut self, yearly: bool) -> Self {
        self.yearly = yearly;
        self
    }

    pub fn with_interval_width(mut self, width: f64) -> Self {
        self.interval_width = width;
        self
    }
}

#[derive(Debug, Clone)]
struct FittedState {
    origin: NaiveDate,
    last_date: NaiveDate,
    n_obs: usize,
    intercept: f64,
    slope: f64,
    weekly: Option<[f64; 7]>,
    yearly: Option<[f64; 12]>,
    sigma: f64,
}

/// Linear trend with day-of-week and month-of-year effects.
#[derive(Debug, Clone, Default)]
pub struct SeasonalTrend {
    config: SeasonalTrendConfig,
    state: Option<FittedState>,
}

impl SeasonalTrend {
    pub fn new(config: SeasonalTrendConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    pub fn config(&self) -> &SeasonalTrendConfig {
        &self.config
    }

    /// Fitted day-of-week effects, Monday first.
    pub fn weekly_effects(&self) -> Option<&[f64; 7]> {
        self.state.as_ref().and_then(|s| s.weekly.as_ref())
    }

    /// Fitted month-of-year effects, January first.
    pub fn yearly_effects(&self) -> Option<&[f64; 12]> {
        self.state.as_ref().and_then(|s| s.yearly.as_ref())
    }

    fn seasonal_signal(&self, actual: f64, trend: f64) -> Option<f64> {
        match self.config.mode {
            SeasonalityMode::Additive => Some(actual - trend),
            SeasonalityMode::Multiplicative if trend.abs() > TREND_EPSILON => {
                Some(actual / trend - 1.0)
            }
            SeasonalityMode::Multiplicative => None,
        }
    }

    fn combine(&self, trend: f64, seasonal: f64) -> f64 {
        match self.config.mode {
            SeasonalityMode::Additive => trend + seasonal,
            SeasonalityMode::Multiplicative => trend * (1.0 + seasonal),
        }
    }
}

impl ForecastModel for SeasonalTrend {
    fn fit(&mut self, history: &DailySeries) -> Result<()> {
        require_history(history)?;
        let width = self.config.interval_width;
        if !(width > 0.0 && width < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "interval width must be in (0, 1), got {}",
                width
            )));
        }

        let dates = history.dates();
        let values = history.values();
        let origin = dates[0];
        let last_date = dates[dates.len() - 1];
        let t: Vec<f64> = dates
            .iter()
            .map(|d| (*d - origin).num_days() as f64)
            .collect();
        let (intercept, slope) = linear_fit(&t, values);
        let trend: Vec<f64> = t.iter().map(|ti| intercept + slope * ti).collect();

        let signal: Vec<Option<f64>> = values
            .iter()
            .zip(&trend)
            .map(|(y, tr)| self.seasonal_signal(*y, *tr))
            .collect();

        let weekly = if self.config.weekly {
            Some(centered_means::<7>(
                dates
                    .iter()
                    .zip(&signal)
                    .filter_map(|(d, s)| s.map(|s| (d.weekday().num_days_from_monday() as usize, s))),
            ))
        } else {
            None
        };

        let span_days = (last_date - origin).num_days();
        let yearly = if self.config.yearly && span_days >= MIN_YEARLY_SPAN_DAYS {
            Some(centered_means::<12>(dates.iter().zip(&signal).filter_map(
                |(d, s)| {
                    s.map(|s| {
                        let w = weekly
                            .map(|w| w[d.weekday().num_days_from_monday() as usize])
                            .unwrap_or(0.0);
                        (d.month0() as usize, s - w)
                    })
                },
            )))
        } else {
            None
        };

        let mut state = FittedState {
            origin,
            last_date,
            n_obs: history.len(),
            intercept,
            slope,
            weekly,
            yearly,
            sigma: 0.0,
        };

        let residuals: Vec<f64> = dates
            .iter()
            .zip(values)
            .map(|(d, y)| {
                let (yhat, _, _, _) = self.point(&state, *d);
                y - yhat
            })
            .collect();
        let sigma = rms(&residuals);
        if !sigma.is_finite() {
            return Err(ForecastError::ComputationError(
                "non-finite residual scale".to_string(),
            ));
        }
        state.sigma = sigma;
        self.state = Some(state);
        Ok(())
    }

    fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<ForecastRow>> {
        let state = self.state.as_ref().ok_or(ForecastError::FitRequired)?;
        let z = interval_z(self.config.interval_width);

        Ok(dates
            .iter()
            .map(|&date| {
                let (yhat, trend, weekly, yearly) = self.point(state, date);
                let ahead = (date - state.last_date).num_days().max(0) as f64;
                let half = z * state.sigma * (1.0 + ahead / state.n_obs as f64).sqrt();
                ForecastRow::new(date, yhat, yhat - half, yhat + half).with_components(
                    Some(trend),
                    yearly,
                    weekly,
                )
            })
            .collect())
    }

    fn name(&self) -> &str {
        "SeasonalTrend"
    }

    fn is_fitted(&self) -> bool {
        self.state.is_some()
    }
}

impl SeasonalTrend {
    /// Point forecast and its (trend, weekly, yearly) components.
    fn point(&self, state: &FittedState, date: NaiveDate) -> (f64, f64, Option<f64>, Option<f64>) {
        let t = (date - state.origin).num_days() as f64;
        let trend = state.intercept + state.slope * t;
        let weekly = state
            .weekly
            .map(|w| w[date.weekday().num_days_from_monday() as usize]);
        let yearly = state.yearly.map(|y| y[date.month0() as usize]);
        let seasonal = weekly.unwrap_or(0.0) + yearly.unwrap_or(0.0);
        (self.combine(trend, seasonal), trend, weekly, yearly)
    }
}

/// Mean per bucket, centered so the populated buckets average to zero.
/// Empty buckets stay at zero.
fn centered_means<const N: usize>(samples: impl Iterator<Item = (usize, f64)>) -> [f64; N] {
    let mut sums = [0.0; N];
    let mut counts = [0usize; N];
    for (bucket, value) in samples {
        sums[bucket] += value;
        counts[bucket] += 1;
    }

    let mut means = [0.0; N];
    let mut populated = 0usize;
    let mut total = 0.0;
    for i in 0..N {
        if counts[i] > 0 {
            means[i] = sums[i] / counts[i] as f64;
            total += means[i];
            populated += 1;
        }
    }
    if populated > 0 {
        let offset = total / populated as f64;
        for i in 0..N {
            if counts[i] > 0 {
                means[i] -= offset;
            }
        }
    }
    means
}
