//! Command-line entry point.
//!
//! ```text
//! store-sales-forecast --train data/train.csv --stores data/stores.csv --output out
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use store_sales_forecast::evaluation::{Evaluation, WalkForwardConfig};
use store_sales_forecast::io::IngestConfig;
use store_sales_forecast::models::{SeasonalTrendConfig, SeasonalityMode};
use store_sales_forecast::pipeline::{self, PipelineConfig};
use store_sales_forecast::transform::{FeatureConfig, OrderPolicy};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Additive,
    Multiplicative,
}

#[derive(Parser)]
#[command(name = "store-sales-forecast")]
#[command(about = "Per-store sales features, walk-forward evaluation and daily forecast")]
#[command(version)]
struct Cli {
    /// Training table (date,store_nbr,family,sales,onpromotion)
    #[arg(long, default_value = "data/train.csv")]
    train: PathBuf,

    /// Store metadata table (store_nbr,city,state,type,cluster)
    #[arg(long, default_value = "data/stores.csv")]
    stores: PathBuf,

    /// Skip the store metadata join
    #[arg(long)]
    no_stores: bool,

    /// Directory for the CSV artifacts
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Lag sizes in days
    #[arg(long, value_delimiter = ',', default_values_t = [1, 7])]
    lags: Vec<usize>,

    /// Rolling mean windows in days
    #[arg(long, value_delimiter = ',', default_values_t = [7, 30])]
    windows: Vec<usize>,

    /// Fail on out-of-order series instead of sorting them
    #[arg(long)]
    strict_order: bool,

    /// Insert zero-sales rows for missing days
    #[arg(long)]
    zero_fill: bool,

    /// Days before the first training cutoff
    #[arg(long, default_value_t = 730)]
    initial_window: u32,

    /// Days between cutoffs
    #[arg(long, default_value_t = 180)]
    fold_period: u32,

    /// Days scored after each cutoff
    #[arg(long, default_value_t = 90)]
    horizon: u32,

    /// Evaluate folds in parallel
    #[arg(long)]
    parallel: bool,

    /// Seasonality mode
    #[arg(long, value_enum, default_value_t = Mode::Multiplicative)]
    mode: Mode,

    /// Width of the forecast interval
    #[arg(long, default_value_t = 0.8)]
    interval_width: f64,

    /// Days to forecast past the last observed date
    #[arg(long, default_value_t = 90)]
    periods: u32,
}

impl Cli {
    fn into_config(self) -> PipelineConfig {
        let order = if self.strict_order {
            OrderPolicy::Strict
        } else {
            OrderPolicy::SortDefensively
        };
        let mode = match self.mode {
            Mode::Additive => SeasonalityMode::Additive,
            Mode::Multiplicative => SeasonalityMode::Multiplicative,
        };
        PipelineConfig::new(self.train)
            .with_stores_path((!self.no_stores).then_some(self.stores))
            .with_output_dir(self.output)
            .with_ingest(IngestConfig::default().with_zero_fill_gaps(self.zero_fill))
            .with_features(
                FeatureConfig::default()
                    .with_lags(self.lags)
                    .with_windows(self.windows)
                    .with_order(order),
            )
            .with_walk_forward(
                WalkForwardConfig::new(self.initial_window, self.fold_period, self.horizon)
                    .with_parallel(self.parallel),
            )
            .with_model(
                SeasonalTrendConfig::default()
                    .with_mode(mode)
                    .with_interval_width(self.interval_width),
            )
            .with_forecast_periods(self.periods)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Cli::parse().into_config();
    let report = match pipeline::run(&config) {
        Ok(report) => report,
        Err(err) => {
            error!(error = %err, "pipeline failed");
            return ExitCode::FAILURE;
        }
    };

    println!(
        "Loaded {} rows across {} series ({} days)",
        report.observations,
        report.series,
        report.daily.len()
    );
    match &report.evaluation {
        Evaluation::Completed(cv) => {
            println!(
                "Walk-forward: {} folds scored, {} failed",
                cv.scored_count(),
                cv.failed_count()
            );
            if let (Some(mae), Some(rmse)) = (cv.mae(), cv.rmse()) {
                println!("  pooled MAE  {:.4}", mae);
                println!("  pooled RMSE {:.4}", rmse);
            }
            if let Some(mean) = cv.mean_fold_rmse() {
                println!("  mean of fold RMSE {:.4}", mean);
            }
        }
        Evaluation::Skipped(skip) => println!("{}", skip),
    }
    println!(
        "In-sample fit (not forecast accuracy): MAE {:.4}, RMSE {:.4}",
        report.in_sample.mae, report.in_sample.rmse
    );
    for path in &report.artifacts {
        info!(path = %path.display(), "artifact");
    }
    ExitCode::SUCCESS
}
