//! In-memory store of raw observations, partitioned by series key.

use super::observation::{Observation, SeriesKey, StoreInfo};
use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate};
use std::collections::{BTreeMap, HashMap};

/// Observations sharing one series key.
///
/// Groups handed out by [`SeriesStore`] are sorted by date with no
/// duplicates. Groups assembled elsewhere are taken as-is and validated by
/// the feature transformer.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesGroup {
    key: SeriesKey,
    observations: Vec<Observation>,
}

impl SeriesGroup {
    /// Build a group from observations in caller order.
    ///
    /// Every observation must carry `key`.
    pub fn new(key: SeriesKey, observations: Vec<Observation>) -> Result<Self> {
        if let Some(stray) = observations.iter().find(|o| o.key() != &key) {
            return Err(ForecastError::InvalidParameter(format!(
                "observation for {} placed in group {}",
                stray.key(),
                key
            )));
        }
        Ok(Self { key, observations })
    }

    pub fn key(&self) -> &SeriesKey {
        &self.key
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Observations dated on or before `date`, in stored order.
    pub fn truncated_to(&self, date: NaiveDate) -> SeriesGroup {
        SeriesGroup {
            key: self.key.clone(),
            observations: self
                .observations
                .iter()
                .filter(|o| o.date() <= date)
                .cloned()
                .collect(),
        }
    }

    pub(crate) fn into_parts(self) -> (SeriesKey, Vec<Observation>) {
        (self.key, self.observations)
    }
}

/// Owns every raw observation, keyed by (store, family, date).
#[derive(Debug, Clone, Default)]
pub struct SeriesStore {
    series: BTreeMap<SeriesKey, BTreeMap<NaiveDate, Observation>>,
    stores: HashMap<String, StoreInfo>,
}

impl SeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from observations, rejecting duplicate (key, date) pairs.
    pub fn from_observations<I>(observations: I) -> Result<Self>
    where
        I: IntoIterator<Item = Observation>,
    {
        let mut store = Self::new();
        for obs in observations {
            store.insert(obs)?;
        }
        Ok(store)
    }

    /// Add an observation.
    pub fn insert(&mut self, observation: Observation) -> Result<()> {
        let rows = self.series.entry(observation.key().clone()).or_default();
        if rows.contains_key(&observation.date()) {
            return Err(ForecastError::MalformedSeries {
                key: observation.key().to_string(),
                date: observation.date(),
            });
        }
        rows.insert(observation.date(), observation);
        Ok(())
    }

    /// Attach store attributes for a store id.
    pub fn set_store_info(&mut self, store_id: impl Into<String>, info: StoreInfo) {
        self.stores.insert(store_id.into(), info);
    }

    /// Store attributes, if the store appeared in the store table.
    pub fn store_info(&self, store_id: &str) -> Option<&StoreInfo> {
        self.stores.get(store_id)
    }

    /// Number of observations across all series.
    pub fn len(&self) -> usize {
        self.series.values().map(|rows| rows.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Number of distinct series keys.
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &SeriesKey> {
        self.series.keys()
    }

    /// Chronologically sorted observations of one series.
    pub fn group(&self, key: &SeriesKey) -> Option<SeriesGroup> {
        self.series.get(key).map(|rows| SeriesGroup {
            key: key.clone(),
            observations: rows.values().cloned().collect(),
        })
    }

    /// All series as sorted groups, in key order.
    pub fn groups(&self) -> Vec<SeriesGroup> {
        self.series
            .iter()
            .map(|(key, rows)| SeriesGroup {
                key: key.clone(),
                observations: rows.values().cloned().collect(),
            })
            .collect()
    }

    /// Iterate over every observation, grouped by key and sorted by date.
    pub fn observations(&self) -> impl Iterator<Item = &Observation> {
        self.series.values().flat_map(|rows| rows.values())
    }

    /// Earliest and latest date across all series.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.series.values().filter_map(|r| r.keys().next()).min()?;
        let last = self.series.values().filter_map(|r| r.keys().next_back()).max()?;
        Some((*first, *last))
    }

    /// Insert zero-sales observations for calendar days missing between a
    /// series' first and last date. Returns the number of rows added.
    pub fn zero_fill_gaps(&mut self) -> Result<usize> {
        let mut added = 0;
        for (key, rows) in self.series.iter_mut() {
            let (first, last) = match (rows.keys().next(), rows.keys().next_back()) {
                (Some(first), Some(last)) => (*first, *last),
                _ => continue,
            };
            let mut day = first;
            while day < last {
                day += Duration::days(1);
                if !rows.contains_key(&day) {
                    rows.insert(day, Observation::new(key.clone(), day, 0.0, 0)?);
                    added += 1;
                }
            }
        }
        Ok(added)
    }
}
