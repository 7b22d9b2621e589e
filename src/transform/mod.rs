//! Data transformations: feature engineering and daily aggregation.
//!
//! # Example
//!
//! ```
//! use store_sales_forecast::core::{Observation, SeriesKey, SeriesStore};
//! use store_sales_forecast::transform::{aggregate_store, FeatureTransformer};
//! use chrono::{Duration, NaiveDate};
//!
//! let key = SeriesKey::new("1", "GROCERY I");
//! let start = NaiveDate::from_ymd_opt(2017, 1, 2).unwrap();
//! let rows = [10.0, 12.0, 9.0].iter().enumerate().map(|(i, &s)| {
//!     Observation::new(key.clone(), start + Duration::days(i as i64), s, 0).unwrap()
//! });
//! let store = SeriesStore::from_observations(rows).unwrap();
//!
//! let features = FeatureTransformer::default().transform(store.groups()).unwrap();
//! assert_eq!(features.rows()[1].lag(1), Some(10.0));
//!
//! let daily = aggregate_store(&store).unwrap();
//! assert_eq!(daily.len(), 3);
//! ```

pub mod aggregate;
pub mod calendar;
pub mod features;
pub mod window;

pub use aggregate::{aggregate, aggregate_store};
pub use calendar::CalendarFeatures;
pub use features::{FeatureConfig, FeatureRow, FeatureTable, FeatureTransformer, OrderPolicy};
pub use window::{lag, rolling_mean, RollingMean};
