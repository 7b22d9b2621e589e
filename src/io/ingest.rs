//! CSV ingestion of the training table and store metadata.
//!
//! `train.csv` carries `date,store_nbr,family,sales,onpromotion`; extra
//! columns such as `id` are ignored and empty `sales`/`onpromotion` cells
//! read as zero. `stores.csv` carries `store_nbr,city,state,type,cluster`
//! and is joined onto the store key.

use crate::core::{Observation, SeriesKey, SeriesStore, StoreInfo};
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Options applied while loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Insert zero-sales rows for days missing inside each series.
    pub zero_fill_gaps: bool,
}

impl IngestConfig {
    pub fn with_zero_fill_gaps(mut self, zero_fill_gaps: bool) -> Self {
        self.zero_fill_gaps = zero_fill_gaps;
        self
    }
}

#[derive(Debug, Deserialize)]
struct TrainRecord {
    date: NaiveDate,
    store_nbr: String,
    family: String,
    sales: Option<f64>,
    onpromotion: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct StoreRecord {
    store_nbr: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    state: String,
    #[serde(rename = "type", default)]
    store_type: String,
    #[serde(default)]
    cluster: Option<u32>,
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Read training observations from any CSV source.
pub fn read_observations<R: Read>(reader: R) -> Result<Vec<Observation>> {
    let mut reader = csv_reader(reader);
    let mut observations = Vec::new();
    for (row, record) in reader.deserialize::<TrainRecord>().enumerate() {
        let record = record?;
        let on_promotion = record.onpromotion.unwrap_or(0.0);
        if !on_promotion.is_finite() || on_promotion < 0.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "row {}: onpromotion must be a non-negative count, got {}",
                row + 1,
                on_promotion
            )));
        }
        let key = SeriesKey::new(record.store_nbr, record.family);
        let observation = Observation::new(
            key,
            record.date,
            record.sales.unwrap_or(0.0),
            on_promotion.round() as u32,
        )
        .map_err(|e| ForecastError::InvalidParameter(format!("row {}: {}", row + 1, e)))?;
        observations.push(observation);
    }
    Ok(observations)
}

/// Read store metadata keyed by store id.
pub fn read_stores<R: Read>(reader: R) -> Result<Vec<(String, StoreInfo)>> {
    let mut reader = csv_reader(reader);
    let mut stores = Vec::new();
    for record in reader.deserialize::<StoreRecord>() {
        let record = record?;
        stores.push((
            record.store_nbr,
            StoreInfo {
                city: record.city,
                state: record.state,
                store_type: record.store_type,
                cluster: record.cluster.unwrap_or(0),
            },
        ));
    }
    Ok(stores)
}

/// Load `train.csv` (and optionally `stores.csv`) into a [`SeriesStore`].
pub fn load_store(
    train_path: &Path,
    stores_path: Option<&Path>,
    config: &IngestConfig,
) -> Result<SeriesStore> {
    let file = std::fs::File::open(train_path).map_err(|e| {
        ForecastError::Io(format!("failed to open {}: {}", train_path.display(), e))
    })?;
    let mut store = SeriesStore::from_observations(read_observations(file)?)?;
    if store.is_empty() {
        return Err(ForecastError::EmptyData);
    }

    if let Some(path) = stores_path {
        let file = std::fs::File::open(path)
            .map_err(|e| ForecastError::Io(format!("failed to open {}: {}", path.display(), e)))?;
        let stores = read_stores(file)?;
        let mut joined = 0;
        for (store_id, info) in stores {
            if store.keys().any(|k| k.store_id() == store_id) {
                joined += 1;
            }
            store.set_store_info(store_id, info);
        }
        let unmatched = store
            .keys()
            .filter(|k| store.store_info(k.store_id()).is_none())
            .count();
        if unmatched > 0 {
            warn!(series = unmatched, "series without store metadata");
        }
        info!(stores = joined, "joined store metadata");
    }

    if config.zero_fill_gaps {
        let added = store.zero_fill_gaps()?;
        info!(rows = added, "zero-filled missing days");
    }

    info!(
        rows = store.len(),
        series = store.series_count(),
        path = %train_path.display(),
        "loaded training data"
    );
    Ok(store)
}
