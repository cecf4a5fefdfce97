//! Bounded, newest-first history of completed runs

use super::KeyValueStore;
use crate::defaults::{HISTORY_CAPACITY, HISTORY_STORAGE_KEY};
use crate::error::Result;
use crate::models::SpeedResult;
use serde::Serialize;

/// The most recent results, newest first, never longer than its capacity
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    entries: Vec<SpeedResult>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Build from stored entries, keeping at most `capacity` of the newest
    pub fn from_entries(mut entries: Vec<SpeedResult>) -> Self {
        entries.truncate(HISTORY_CAPACITY);
        Self {
            entries,
            capacity: HISTORY_CAPACITY,
        }
    }

    /// Prepend a result, evicting the oldest entries beyond capacity
    pub fn push(&mut self, result: SpeedResult) {
        self.entries.insert(0, result);
        self.entries.truncate(self.capacity);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[SpeedResult] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&SpeedResult> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SpeedResult> {
        self.entries.iter()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.entries)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<SpeedResult> = serde_json::from_str(json)?;
        Ok(Self::from_entries(entries))
    }

    /// Best-effort load: a missing key or unreadable content yields an empty history
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let raw = match store.get(HISTORY_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::new(),
            Err(e) => {
                tracing::warn!(error = %e, "history storage unreadable, starting empty");
                return Self::new();
            }
        };

        match Self::from_json(&raw) {
            Ok(history) => {
                tracing::debug!(entries = history.len(), "loaded history");
                history
            }
            Err(e) => {
                tracing::warn!(error = %e, "history parse error, discarding stored data");
                Self::new()
            }
        }
    }

    /// Serialize the whole history and store it under the history key
    pub fn save(&self, store: &dyn KeyValueStore) -> Result<()> {
        store.set(HISTORY_STORAGE_KEY, &self.to_json()?)
    }

    /// Aggregate figures over the stored results
    pub fn summary(&self) -> Option<HistorySummary> {
        if self.entries.is_empty() {
            return None;
        }

        Some(HistorySummary {
            count: self.entries.len(),
            avg_download: average(&self.entries, |r| r.download_speed),
            avg_upload: average(&self.entries, |r| r.upload_speed),
            avg_ping: average(&self.entries, |r| r.ping),
            best_download: self
                .entries
                .iter()
                .map(|r| r.download_speed)
                .fold(f64::MIN, f64::max),
        })
    }
}

fn average(entries: &[SpeedResult], metric: impl Fn(&SpeedResult) -> f64) -> f64 {
    entries.iter().map(metric).sum::<f64>() / entries.len() as f64
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a SpeedResult;
    type IntoIter = std::slice::Iter<'a, SpeedResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Derived averages over the history; never persisted
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub count: usize,
    pub avg_download: f64,
    pub avg_upload: f64,
    pub avg_ping: f64,
    pub best_download: f64,
}
