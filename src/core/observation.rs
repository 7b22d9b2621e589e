//! Raw sales observations and the keys that identify their series.

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one (store, product-family) time series.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeriesKey {
    store_id: String,
    family: String,
}

impl SeriesKey {
    pub fn new(store_id: impl Into<String>, family: impl Into<String>) -> Self {
        Self {
            store_id: store_id.into(),
            family: family.into(),
        }
    }

    pub fn store_id(&self) -> &str {
        &self.store_id
    }

    pub fn family(&self) -> &str {
        &self.family
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.store_id, self.family)
    }
}

/// One day of sales for one series.
///
/// Observations are immutable once built. Missing sales and promotion
/// counts are normalized to zero before construction, so every observation
/// carries a finite, non-negative sales value.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    key: SeriesKey,
    date: NaiveDate,
    sales: f64,
    on_promotion: u32,
}

impl Observation {
    /// Create an observation, rejecting negative or non-finite sales.
    pub fn new(key: SeriesKey, date: NaiveDate, sales: f64, on_promotion: u32) -> Result<Self> {
        if !sales.is_finite() || sales < 0.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "sales for {} on {} must be finite and non-negative, got {}",
                key, date, sales
            )));
        }
        Ok(Self {
            key,
            date,
            sales,
            on_promotion,
        })
    }

    pub fn key(&self) -> &SeriesKey {
        &self.key
    }

    pub fn store_id(&self) -> &str {
        self.key.store_id()
    }

    pub fn family(&self) -> &str {
        self.key.family()
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn sales(&self) -> f64 {
        self.sales
    }

    /// Number of items of the family on promotion that day.
    pub fn on_promotion(&self) -> u32 {
        self.on_promotion
    }

    pub fn is_on_promotion(&self) -> bool {
        self.on_promotion > 0
    }
}

/// Store attributes joined onto observations at ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoreInfo {
    pub city: String,
    pub state: String,
    pub store_type: String,
    pub cluster: u32,
}
