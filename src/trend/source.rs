use std::future::Future;

use chrono::{DateTime, Utc};

use crate::trend::reducer::TimedEvent;
use crate::trend::TrendError;

/// Read-only access to the events of one kind, grouped by series key.
///
/// Results are ordered ascending by `(occurred_at, event_id)`, so "most
/// recent" is always the last element of that order.
pub trait EventSource: Sync {
    type Event: TimedEvent + Send + Sync;

    /// All events of `key` with `start <= occurred_at < end`.
    fn events_in_range(
        &self,
        key: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Self::Event>, TrendError>> + Send;

    /// The single most recent event of `key` with `occurred_at < before`.
    fn latest_before(
        &self,
        key: &str,
        before: DateTime<Utc>,
    ) -> impl Future<Output = Result<Option<Self::Event>, TrendError>> + Send;
}
