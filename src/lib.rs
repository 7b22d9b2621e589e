//! # store-sales-forecast
//!
//! Daily sales forecasting for a retail chain: leak-free lag and rolling
//! features per (store, family) series, aggregation to a chain-wide daily
//! series, and walk-forward evaluation of forecast models with pooled and
//! per-horizon error metrics.

pub mod core;
pub mod error;
pub mod evaluation;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod transform;
pub mod utils;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::core::{DailySeries, ForecastRow, ForecastTable, Observation, SeriesKey, SeriesStore};
    pub use crate::error::{ForecastError, Result};
    pub use crate::evaluation::{Evaluation, WalkForwardConfig, WalkForwardEvaluator};
    pub use crate::models::{ForecastModel, Naive, SeasonalTrend, SeasonalTrendConfig};
    pub use crate::transform::{aggregate, FeatureConfig, FeatureTransformer};
    pub use crate::utils::{calculate_metrics, ErrorMetrics};
}
