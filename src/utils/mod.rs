//! Utility functions for models and evaluation.

pub mod metrics;
pub mod stats;

pub use metrics::{calculate_metrics, mape, smape, ErrorMetrics, ResidualSums};
pub use stats::{interval_z, linear_fit, mean, quantile_normal, rms};
