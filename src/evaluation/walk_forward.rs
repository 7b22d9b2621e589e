//! Walk-forward (expanding-window) evaluation of forecast models.

use super::folds::{generate_folds, Fold, WalkForwardConfig};
use super::horizon::{horizon_metrics, FoldPoint, HorizonMetrics};
use crate::core::DailySeries;
use crate::error::{ForecastError, Result};
use crate::models::{validate_forecast, ForecastModel};
use crate::utils::{ErrorMetrics, ResidualSums};
use chrono::NaiveDate;
use rayon::prelude::*;
use std::fmt;
use tracing::{debug, info, warn};

/// How one fold ended.
#[derive(Debug, Clone, PartialEq)]
pub enum FoldOutcome {
    /// The fold was fitted, predicted and scored.
    Scored {
        metrics: ErrorMetrics,
        points: Vec<FoldPoint>,
    },
    /// The factory, fit, predict or output validation failed.
    Failed(ForecastError),
}

/// A fold together with its outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct FoldReport {
    pub fold: Fold,
    pub outcome: FoldOutcome,
}

impl FoldReport {
    pub fn metrics(&self) -> Option<&ErrorMetrics> {
        match &self.outcome {
            FoldOutcome::Scored { metrics, .. } => Some(metrics),
            FoldOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ForecastError> {
        match &self.outcome {
            FoldOutcome::Failed(err) => Some(err),
            FoldOutcome::Scored { .. } => None,
        }
    }

    pub fn points(&self) -> &[FoldPoint] {
        match &self.outcome {
            FoldOutcome::Scored { points, .. } => points,
            FoldOutcome::Failed(_) => &[],
        }
    }
}

/// Out-of-sample results of a walk-forward run.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkForwardReport {
    pub model: String,
    pub folds: Vec<FoldReport>,
    /// Metrics over the residuals of every scored fold combined; `None`
    /// when no fold was scored.
    pub pooled: Option<ErrorMetrics>,
    pub horizons: Vec<HorizonMetrics>,
}

impl WalkForwardReport {
    /// Per-fold metrics of the scored folds, in fold order.
    pub fn fold_metrics(&self) -> Vec<(Fold, ErrorMetrics)> {
        self.folds
            .iter()
            .filter_map(|r| r.metrics().map(|m| (r.fold, *m)))
            .collect()
    }

    /// Folds that failed, with the retained error.
    pub fn failed_folds(&self) -> Vec<(Fold, &ForecastError)> {
        self.folds
            .iter()
            .filter_map(|r| r.error().map(|e| (r.fold, e)))
            .collect()
    }

    pub fn failed_count(&self) -> usize {
        self.folds.iter().filter(|r| r.error().is_some()).count()
    }

    pub fn scored_count(&self) -> usize {
        self.folds.len() - self.failed_count()
    }

    /// Pooled mean absolute error.
    pub fn mae(&self) -> Option<f64> {
        self.pooled.map(|m| m.mae)
    }

    /// Pooled root-mean-squared error.
    pub fn rmse(&self) -> Option<f64> {
        self.pooled.map(|m| m.rmse)
    }

    /// Unweighted mean of per-fold RMSE. Differs from the pooled RMSE
    /// whenever folds have unequal sizes or error levels.
    pub fn mean_fold_rmse(&self) -> Option<f64> {
        let rmses: Vec<f64> = self.fold_metrics().iter().map(|(_, m)| m.rmse).collect();
        if rmses.is_empty() {
            return None;
        }
        Some(rmses.iter().sum::<f64>() / rmses.len() as f64)
    }

    /// Every scored point across folds, in fold order.
    pub fn points(&self) -> impl Iterator<Item = &FoldPoint> {
        self.folds.iter().flat_map(|r| r.points().iter())
    }
}

/// Why no fold could be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationSkipped {
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    /// Days between the first and last date.
    pub available_days: i64,
    /// `initial_window + horizon`.
    pub required_days: i64,
}

impl fmt::Display for EvaluationSkipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.first_date, self.last_date) {
            (Some(first), Some(last)) => write!(
                f,
                "evaluation skipped: {} to {} spans {} days, one fold needs {}",
                first, last, self.available_days, self.required_days
            ),
            _ => write!(f, "evaluation skipped: empty series"),
        }
    }
}

/// Result of a walk-forward run: a report, or an explicit skip.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Completed(WalkForwardReport),
    Skipped(EvaluationSkipped),
}

impl Evaluation {
    pub fn report(&self) -> Option<&WalkForwardReport> {
        match self {
            Evaluation::Completed(report) => Some(report),
            Evaluation::Skipped(_) => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Evaluation::Skipped(_))
    }
}

/// Repeatedly fits fresh models on expanding windows and scores them on
/// the days that follow each cutoff.
#[derive(Debug, Clone, Default)]
pub struct WalkForwardEvaluator {
    config: WalkForwardConfig,
}

impl WalkForwardEvaluator {
    pub fn new(config: WalkForwardConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &WalkForwardConfig {
        &self.config
    }

    /// Folds this evaluator would run on `series`.
    pub fn folds(&self, series: &DailySeries) -> Result<Vec<Fold>> {
        match (series.first_date(), series.last_date()) {
            (Some(first), Some(last)) => generate_folds(first, last, &self.config),
            _ => Ok(Vec::new()),
        }
    }

    /// Evaluate models built by `model_factory` on every fold.
    ///
    /// Each fold gets its own instance. A fold whose factory, fit, predict
    /// or output validation fails is reported as failed and the remaining
    /// folds still run. Returns [`Evaluation::Skipped`] when the series is
    /// too short for a single fold.
    pub fn evaluate<M, F>(&self, series: &DailySeries, model_factory: F) -> Result<Evaluation>
    where
        M: ForecastModel,
        F: Fn() -> Result<M> + Sync,
    {
        let folds = self.folds(series)?;
        if folds.is_empty() {
            let skipped = EvaluationSkipped {
                first_date: series.first_date(),
                last_date: series.last_date(),
                available_days: match (series.first_date(), series.last_date()) {
                    (Some(first), Some(last)) => (last - first).num_days(),
                    _ => 0,
                },
                required_days: self.config.required_span_days(),
            };
            info!(%skipped, "no walk-forward folds");
            return Ok(Evaluation::Skipped(skipped));
        }

        info!(
            folds = folds.len(),
            initial_window = self.config.initial_window,
            fold_period = self.config.fold_period,
            horizon = self.config.horizon,
            parallel = self.config.parallel,
            "starting walk-forward evaluation"
        );

        let run = |fold: &Fold| -> (FoldReport, String, ResidualSums) {
            let (outcome, name, sums) = evaluate_fold(series, fold, &model_factory);
            (FoldReport { fold: *fold, outcome }, name, sums)
        };
        let results: Vec<(FoldReport, String, ResidualSums)> = if self.config.parallel {
            folds.par_iter().map(run).collect()
        } else {
            folds.iter().map(run).collect()
        };

        let model = results
            .iter()
            .map(|(_, name, _)| name.as_str())
            .find(|name| !name.is_empty())
            .unwrap_or_default()
            .to_string();

        // Per-fold sums are merged in fold order, whichever thread built them.
        let mut pooled = ResidualSums::new();
        let mut reports = Vec::with_capacity(results.len());
        for (report, _, sums) in results {
            pooled.merge(&sums);
            reports.push(report);
        }

        for report in &reports {
            match &report.outcome {
                FoldOutcome::Scored { metrics, .. } => {
                    debug!(
                        fold = report.fold.index,
                        cutoff = %report.fold.training_cutoff,
                        mae = metrics.mae,
                        rmse = metrics.rmse,
                        "fold scored"
                    );
                }
                FoldOutcome::Failed(err) => {
                    warn!(
                        fold = report.fold.index,
                        cutoff = %report.fold.training_cutoff,
                        error = %err,
                        "fold failed"
                    );
                }
            }
        }

        let horizons = horizon_metrics(reports.iter().flat_map(|r| r.points().iter()));
        let report = WalkForwardReport {
            model,
            folds: reports,
            pooled: pooled.metrics(),
            horizons,
        };
        info!(
            scored = report.scored_count(),
            failed = report.failed_count(),
            mae = report.mae(),
            rmse = report.rmse(),
            "walk-forward evaluation finished"
        );
        Ok(Evaluation::Completed(report))
    }
}

/// Fit, predict and score one fold. Also returns the model name, empty
/// when the factory failed, and the fold's residual sums, empty when the
/// fold failed.
fn evaluate_fold<M, F>(
    series: &DailySeries,
    fold: &Fold,
    model_factory: &F,
) -> (FoldOutcome, String, ResidualSums)
where
    M: ForecastModel,
    F: Fn() -> Result<M>,
{
    let mut name = String::new();
    match score_fold(series, fold, model_factory, &mut name) {
        Ok((metrics, points, sums)) => (FoldOutcome::Scored { metrics, points }, name, sums),
        Err(err) => (FoldOutcome::Failed(err), name, ResidualSums::new()),
    }
}

fn score_fold<M, F>(
    series: &DailySeries,
    fold: &Fold,
    model_factory: &F,
    name: &mut String,
) -> Result<(ErrorMetrics, Vec<FoldPoint>, ResidualSums)>
where
    M: ForecastModel,
    F: Fn() -> Result<M>,
{
    let training = series.up_to(fold.training_cutoff);
    let targets = series.between(fold.horizon_start, fold.horizon_end);
    if targets.is_empty() {
        return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
    }

    let mut model = model_factory()?;
    name.push_str(model.name());
    model.fit(&training)?;
    let rows = model.predict(targets.dates())?;
    validate_forecast(targets.dates(), &rows)?;

    let mut sums = ResidualSums::new();
    for (row, &actual) in rows.iter().zip(targets.values()) {
        sums.push(actual, row.yhat);
    }
    let metrics = sums.metrics().ok_or(ForecastError::EmptyData)?;
    let points = rows
        .iter()
        .zip(targets.values())
        .map(|(row, &actual)| FoldPoint {
            date: row.date,
            days_ahead: fold.days_ahead(row.date),
            actual,
            yhat: row.yhat,
            yhat_lower: row.yhat_lower,
            yhat_upper: row.yhat_upper,
        })
        .collect();
    Ok((metrics, points, sums))
}
