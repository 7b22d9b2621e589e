//! Forecasting models.
//!
//! The evaluation harness and the production forecast only depend on the
//! [`ForecastModel`] trait; the models here are simple, dependency-free
//! implementations of it.

mod traits;

pub mod baseline;
pub mod seasonal_trend;

pub use baseline::Naive;
pub use seasonal_trend::{SeasonalTrend, SeasonalTrendConfig, SeasonalityMode};
pub use traits::{validate_forecast, BoxedModel, ForecastModel};
