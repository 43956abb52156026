pub mod keys;
pub mod migrate;
pub mod operations;
pub mod source;
pub mod trees;

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::Db;
use thiserror::Error;

pub use source::StoredEvents;

#[derive(Debug)]
pub struct Store {
    db: Db,
    pub build_runs: sled::Tree,
    pub work_item_transitions: sled::Tree,
    pub coverage_snapshots: sled::Tree,
    pub meta: sled::Tree,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("migration error at version {version}: {message}")]
    Migration { version: u32, message: String },
}

impl Store {
    pub fn open(sled_path: &str) -> Result<Self, StoreError> {
        let db = sled::open(sled_path)?;
        let build_runs = db.open_tree(trees::BUILD_RUNS)?;
        let work_item_transitions = db.open_tree(trees::WORK_ITEM_TRANSITIONS)?;
        let coverage_snapshots = db.open_tree(trees::COVERAGE_SNAPSHOTS)?;
        let meta = db.open_tree(trees::META)?;

        Ok(Self {
            db,
            build_runs,
            work_item_transitions,
            coverage_snapshots,
            meta,
        })
    }

    pub fn run_migrations(&self) -> Result<(), StoreError> {
        migrate::run(self)
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    pub(crate) fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec(value)?)
    }

    pub(crate) fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub(crate) fn put_event<T: Serialize>(
        tree: &sled::Tree,
        series_key: &str,
        timestamp_ms: i64,
        event_id: &str,
        event: &T,
    ) -> Result<(), StoreError> {
        let key = keys::event_key(series_key, timestamp_ms, event_id)?;
        tree.insert(key.as_bytes(), Self::serialize(event)?)?;
        Ok(())
    }

    /// Events of `series_key` with `start_ms <= ts < end_ms`, oldest first.
    pub(crate) fn scan_range<T: DeserializeOwned>(
        tree: &sled::Tree,
        series_key: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<T>, StoreError> {
        if end_ms <= start_ms {
            return Ok(Vec::new());
        }
        let lower = keys::series_time_bound(series_key, start_ms)?;
        let upper = keys::series_time_bound(series_key, end_ms)?;

        let mut out = Vec::new();
        for item in tree.range(lower.as_bytes()..upper.as_bytes()) {
            let (_, value) = item?;
            out.push(Self::deserialize(&value)?);
        }
        Ok(out)
    }

    /// Newest event of `series_key` with `ts < before_ms`; ties resolve to the
    /// greatest event id.
    pub(crate) fn last_before<T: DeserializeOwned>(
        tree: &sled::Tree,
        series_key: &str,
        before_ms: i64,
    ) -> Result<Option<T>, StoreError> {
        let lower = keys::series_prefix(series_key)?;
        let upper = keys::series_time_bound(series_key, before_ms)?;

        match tree.range(lower.as_bytes()..upper.as_bytes()).next_back() {
            Some(item) => {
                let (_, value) = item?;
                Ok(Some(Self::deserialize(&value)?))
            }
            None => Ok(None),
        }
    }

    /// Distinct series keys present in `tree`, sorted.
    pub fn list_series_keys(tree: &sled::Tree) -> Result<Vec<String>, StoreError> {
        let mut seen = BTreeSet::new();
        for item in tree.iter().keys() {
            let key = item?;
            if let Some(series) = keys::parse_series_key(&key) {
                seen.insert(series.to_string());
            }
        }
        Ok(seen.into_iter().collect())
    }
}
