//! Week-bucketed trend aggregation.
//!
//! Sparse, irregularly timed events are assigned to fixed one-week buckets
//! anchored at the report start, folded into one aggregate per bucket, then
//! filled forward so every bucket of the window carries a value. Several
//! filled series can finally be merged into a single per-bucket rollup.

pub mod bucket;
pub mod fill;
pub mod interval;
pub mod merge;
pub mod pipeline;
pub mod reducer;
pub mod series;
pub mod source;

use chrono::{DateTime, Utc};
use thiserror::Error;

pub use bucket::{bucket_by_week, group_by_key, week_index};
pub use fill::{carry_forward, make_continuous, reset_each_week};
pub use interval::{create_intervals, Intervals};
pub use merge::{merge_series, running_wip, sum_rollup, union_cardinality, union_rollup};
pub use pipeline::{weekly_series, SeriesOptions};
pub use reducer::{Count, Filtered, IdSet, LastWins, Reducer, Sum, TimedEvent};
pub use series::{DenseSeries, Rollup, SparseSeries};
pub use source::EventSource;

#[derive(Debug, Error)]
pub enum TrendError {
    #[error("invalid range: end {end} is not after start {start}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("invariant violation in series '{key}': {message}")]
    InvariantViolation { key: String, message: String },
    #[error("event source error: {0}")]
    Fetch(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl TrendError {
    pub fn invariant(key: &str, message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            key: key.to_string(),
            message: message.into(),
        }
    }

    pub fn fetch<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Fetch(Box::new(error))
    }
}
