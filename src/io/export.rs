//! CSV artifacts written by the pipeline.
//!
//! `forecast_results.csv` has the fixed column set
//! `date,yhat,yhat_lower,yhat_upper,trend,yearly,weekly`; absent components
//! are written as empty cells.

use crate::core::{ForecastRow, ForecastTable, SeriesStore};
use crate::error::Result;
use crate::evaluation::{FoldOutcome, HorizonMetrics, WalkForwardReport};
use crate::transform::FeatureTable;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;

/// Write the feature table, joined with store metadata when available.
pub fn write_features(path: &Path, table: &FeatureTable, store: &SeriesStore) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header: Vec<String> = [
        "date",
        "store_nbr",
        "family",
        "sales",
        "onpromotion",
        "city",
        "state",
        "type",
        "cluster",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect();
    header.extend(table.feature_columns());
    writer.write_record(&header)?;

    for row in table.rows() {
        let obs = row.observation();
        let cal = row.calendar();
        let info = store.store_info(obs.store_id());
        let mut record = vec![
            obs.date().to_string(),
            obs.store_id().to_string(),
            obs.family().to_string(),
            obs.sales().to_string(),
            obs.on_promotion().to_string(),
            info.map(|i| i.city.clone()).unwrap_or_default(),
            info.map(|i| i.state.clone()).unwrap_or_default(),
            info.map(|i| i.store_type.clone()).unwrap_or_default(),
            info.map(|i| i.cluster.to_string()).unwrap_or_default(),
            cal.year.to_string(),
            cal.month.to_string(),
            cal.day.to_string(),
            cal.day_of_week.to_string(),
            u8::from(cal.is_weekend).to_string(),
        ];
        record.extend(
            row.lags()
                .iter()
                .map(|(_, v)| v.map(|v| v.to_string()).unwrap_or_default()),
        );
        record.extend(row.rolling_means().iter().map(|(_, v)| v.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a forecast table as `forecast_results.csv`.
pub fn write_forecast(path: &Path, table: &ForecastTable) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in table.rows() {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a persisted forecast back, validating bounds and date order.
pub fn read_forecast(path: &Path) -> Result<ForecastTable> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader
        .deserialize::<ForecastRow>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    ForecastTable::new(rows)
}

#[derive(Debug, Serialize)]
struct FoldMetricsRecord<'a> {
    fold: usize,
    training_cutoff: NaiveDate,
    horizon_start: NaiveDate,
    horizon_end: NaiveDate,
    status: &'static str,
    n_points: Option<usize>,
    mae: Option<f64>,
    rmse: Option<f64>,
    error: Option<&'a str>,
}

/// Write one line per fold: its window, status, and metrics or error.
pub fn write_fold_metrics(path: &Path, report: &WalkForwardReport) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for fold_report in &report.folds {
        let fold = fold_report.fold;
        let message;
        let record = match &fold_report.outcome {
            FoldOutcome::Scored { metrics, .. } => FoldMetricsRecord {
                fold: fold.index,
                training_cutoff: fold.training_cutoff,
                horizon_start: fold.horizon_start,
                horizon_end: fold.horizon_end,
                status: "scored",
                n_points: Some(metrics.n_points),
                mae: Some(metrics.mae),
                rmse: Some(metrics.rmse),
                error: None,
            },
            FoldOutcome::Failed(err) => {
                message = err.to_string();
                FoldMetricsRecord {
                    fold: fold.index,
                    training_cutoff: fold.training_cutoff,
                    horizon_start: fold.horizon_start,
                    horizon_end: fold.horizon_end,
                    status: "failed",
                    n_points: None,
                    mae: None,
                    rmse: None,
                    error: Some(&message),
                }
            }
        };
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the per-horizon metrics table.
pub fn write_horizon_metrics(path: &Path, horizons: &[HorizonMetrics]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for h in horizons {
        writer.serialize(h)?;
    }
    writer.flush()?;
    Ok(())
}
