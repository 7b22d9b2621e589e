//! Out-of-sample evaluation.
//!
//! [`WalkForwardEvaluator`] splits a daily series into expanding-window
//! folds, fits a fresh model per fold and pools the residuals. In-sample
//! diagnostics live separately in [`in_sample_metrics`].

mod folds;
mod horizon;
mod in_sample;
mod walk_forward;

pub use folds::{generate_folds, Fold, WalkForwardConfig};
pub use horizon::{horizon_metrics, FoldPoint, HorizonMetrics};
pub use in_sample::{in_sample_metrics, InSampleMetrics};
pub use walk_forward::{
    Evaluation, EvaluationSkipped, FoldOutcome, FoldReport, WalkForwardEvaluator,
    WalkForwardReport,
};
