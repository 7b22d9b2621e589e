//! CSV boundary: loading the raw tables and writing pipeline artifacts.

mod export;
mod ingest;

pub use export::{
    read_forecast, write_features, write_fold_metrics, write_forecast, write_horizon_metrics,
};
pub use ingest::{load_store, read_observations, read_stores, IngestConfig};
