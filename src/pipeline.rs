//! End-to-end run: load, derive features, evaluate, forecast, persist.

use crate::core::{DailySeries, ForecastTable};
use crate::error::{ForecastError, Result};
use crate::evaluation::{
    in_sample_metrics, Evaluation, InSampleMetrics, WalkForwardConfig, WalkForwardEvaluator,
};
use crate::io::{self, IngestConfig};
use crate::models::{validate_forecast, ForecastModel, SeasonalTrend, SeasonalTrendConfig};
use crate::transform::{aggregate, FeatureConfig, FeatureTransformer};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Artifact file names written into the output directory.
pub const FEATURES_FILE: &str = "preprocessed_data.csv";
pub const FORECAST_FILE: &str = "forecast_results.csv";
pub const FOLD_METRICS_FILE: &str = "cv_fold_metrics.csv";
pub const HORIZON_METRICS_FILE: &str = "cv_horizon_metrics.csv";

/// Everything a pipeline run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub train_path: PathBuf,
    pub stores_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub ingest: IngestConfig,
    pub features: FeatureConfig,
    pub walk_forward: WalkForwardConfig,
    pub model: SeasonalTrendConfig,
    /// Days forecast past the end of the history.
    pub forecast_periods: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            train_path: PathBuf::from("data/train.csv"),
            stores_path: Some(PathBuf::from("data/stores.csv")),
            output_dir: PathBuf::from("."),
            ingest: IngestConfig::default(),
            features: FeatureConfig::default(),
            walk_forward: WalkForwardConfig::default(),
            model: SeasonalTrendConfig::default(),
            forecast_periods: 90,
        }
    }
}

impl PipelineConfig {
    pub fn new(train_path: impl Into<PathBuf>) -> Self {
        Self {
            train_path: train_path.into(),
            ..Self::default()
        }
    }

    pub fn with_stores_path(mut self, path: Option<PathBuf>) -> Self {
        self.stores_path = path;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_ingest(mut self, ingest: IngestConfig) -> Self {
        self.ingest = ingest;
        self
    }

    pub fn with_features(mut self, features: FeatureConfig) -> Self {
        self.features = features;
        self
    }

    pub fn with_walk_forward(mut self, walk_forward: WalkForwardConfig) -> Self {
        self.walk_forward = walk_forward;
        self
    }

    pub fn with_model(mut self, model: SeasonalTrendConfig) -> Self {
        self.model = model;
        self
    }

    pub fn with_forecast_periods(mut self, periods: u32) -> Self {
        self.forecast_periods = periods;
        self
    }

    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }
}

/// What a pipeline run produced.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub observations: usize,
    pub series: usize,
    pub daily: DailySeries,
    pub evaluation: Evaluation,
    pub in_sample: InSampleMetrics,
    pub forecast: ForecastTable,
    pub artifacts: Vec<PathBuf>,
}

/// Fit `model` on `history` and predict every history date plus `periods`
/// days after the last one.
pub fn forecast<M: ForecastModel + ?Sized>(
    model: &mut M,
    history: &DailySeries,
    periods: u32,
) -> Result<ForecastTable> {
    let last = history.last_date().ok_or(ForecastError::EmptyData)?;
    if last.checked_add_days(Days::new(u64::from(periods))).is_none() {
        return Err(ForecastError::InvalidParameter(format!(
            "forecasting {} days past {} leaves the supported date range",
            periods, last
        )));
    }
    let mut dates: Vec<NaiveDate> = history.dates().to_vec();
    dates.extend((1..=u64::from(periods)).filter_map(|h| last.checked_add_days(Days::new(h))));

    model.fit(history)?;
    let rows = model.predict(&dates)?;
    validate_forecast(&dates, &rows)?;
    ForecastTable::new(rows)
}

/// Run the full pipeline and write every artifact into `output_dir`.
pub fn run(config: &PipelineConfig) -> Result<PipelineReport> {
    let transformer = FeatureTransformer::new(config.features.clone())?;
    let evaluator = WalkForwardEvaluator::new(config.walk_forward.clone())?;
    std::fs::create_dir_all(&config.output_dir)?;
    let mut artifacts = Vec::new();

    let store = io::load_store(
        &config.train_path,
        config.stores_path.as_deref(),
        &config.ingest,
    )?;

    let features = transformer.transform(store.groups())?;
    let path = config.artifact_path(FEATURES_FILE);
    io::write_features(&path, &features, &store)?;
    info!(rows = features.len(), path = %path.display(), "wrote features");
    artifacts.push(path);

    let daily = aggregate(features.observations())?;
    info!(
        days = daily.len(),
        first = ?daily.first_date(),
        last = ?daily.last_date(),
        "aggregated daily sales"
    );

    let model_config = config.model.clone();
    let evaluation = evaluator.evaluate(&daily, || Ok(SeasonalTrend::new(model_config.clone())))?;
    if let Evaluation::Completed(report) = &evaluation {
        let path = config.artifact_path(FOLD_METRICS_FILE);
        io::write_fold_metrics(&path, report)?;
        artifacts.push(path);
        let path = config.artifact_path(HORIZON_METRICS_FILE);
        io::write_horizon_metrics(&path, &report.horizons)?;
        artifacts.push(path);
    }

    let in_sample = in_sample_metrics(&mut SeasonalTrend::new(config.model.clone()), &daily)?;

    let mut model = SeasonalTrend::new(config.model.clone());
    let table = forecast(&mut model, &daily, config.forecast_periods)?;
    let path = config.artifact_path(FORECAST_FILE);
    io::write_forecast(&path, &table)?;
    info!(rows = table.len(), path = %path.display(), "wrote forecast");
    artifacts.push(path);

    Ok(PipelineReport {
        observations: store.len(),
        series: store.series_count(),
        daily,
        evaluation,
        in_sample,
        forecast: table,
        artifacts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Naive;
    use approx::assert_relative_eq;
    use chrono::Duration;

    fn day(i: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2016, 1, 1).unwrap() + Duration::days(i)
    }

    #[test]
    fn forecast_covers_history_and_future() {
        let history =
            DailySeries::new((0..10).map(day).collect(), (0..10).map(|i| i as f64).collect())
                .unwrap();
        let mut model = Naive::new();
        let table = forecast(&mut model, &history, 5).unwrap();

        assert_eq!(table.len(), 15);
        assert_eq!(table.rows()[0].date, day(0));
        assert_eq!(table.rows()[14].date, day(14));
        assert_eq!(table.after(day(9)).len(), 5);
        assert_relative_eq!(table.rows()[12].yhat, 9.0);
    }

    #[test]
    fn forecast_through_boxed_model() {
        let history =
            DailySeries::new((0..10).map(day).collect(), vec![3.0; 10]).unwrap();
        let mut model: crate::models::BoxedModel = Box::new(Naive::new());
        let table = forecast(&mut model, &history, 0).unwrap();
        assert_eq!(table.len(), 10);
    }

    #[test]
    fn forecast_of_empty_history_fails() {
        let mut model = Naive::new();
        let err = forecast(&mut model, &DailySeries::default(), 3).unwrap_err();
        assert_eq!(err, ForecastError::EmptyData);
    }

    #[test]
    fn forecast_past_the_date_range_is_rejected() {
        let history =
            DailySeries::new((0..10).map(day).collect(), (0..10).map(|i| i as f64).collect())
                .unwrap();
        let mut model = Naive::new();
        let err = forecast(&mut model, &history, u32::MAX).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidParameter(_)));
        assert!(!model.is_fitted());
    }

    #[test]
    fn builders_set_fields() {
        let config = PipelineConfig::new("in/train.csv")
            .with_stores_path(None)
            .with_output_dir("out")
            .with_forecast_periods(14);
        assert_eq!(config.train_path, PathBuf::from("in/train.csv"));
        assert_eq!(config.stores_path, None);
        assert_eq!(config.artifact_path(FORECAST_FILE), PathBuf::from("out/forecast_results.csv"));
        assert_eq!(config.forecast_periods, 14);
        assert_eq!(config.walk_forward, WalkForwardConfig::default());
    }
}
