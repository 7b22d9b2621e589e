//! Core data structures: raw observations, series groups, daily totals and forecasts.

mod daily_series;
mod forecast;
mod observation;
mod series_store;

pub use daily_series::DailySeries;
pub use forecast::{ForecastRow, ForecastTable};
pub use observation::{Observation, SeriesKey, StoreInfo};
pub use series_store::{SeriesGroup, SeriesStore};
