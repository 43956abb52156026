use std::future::{ready, Future};
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use crate::store::Store;
use crate::trend::{EventSource, TimedEvent, TrendError};

/// One event tree of the store seen as an [`EventSource`].
///
/// sled reads are synchronous, so both queries resolve immediately.
#[derive(Debug)]
pub struct StoredEvents<'a, E> {
    tree: &'a sled::Tree,
    _event: PhantomData<fn() -> E>,
}

impl<'a, E> StoredEvents<'a, E> {
    pub fn new(tree: &'a sled::Tree) -> Self {
        Self {
            tree,
            _event: PhantomData,
        }
    }
}

impl<E> EventSource for StoredEvents<'_, E>
where
    E: DeserializeOwned + TimedEvent + Send + Sync,
{
    type Event = E;

    fn events_in_range(
        &self,
        key: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<E>, TrendError>> + Send {
        let result = Store::scan_range(
            self.tree,
            key,
            start.timestamp_millis(),
            end.timestamp_millis(),
        )
        .map_err(TrendError::fetch);
        if let Err(e) = &result {
            tracing::warn!(series = key, error = %e, "Failed to read events in range");
        }
        ready(result)
    }

    fn latest_before(
        &self,
        key: &str,
        before: DateTime<Utc>,
    ) -> impl Future<Output = Result<Option<E>, TrendError>> + Send {
        let result = Store::last_before(self.tree, key, before.timestamp_millis())
            .map_err(TrendError::fetch);
        if let Err(e) = &result {
            tracing::warn!(series = key, error = %e, "Failed to read latest event before window");
        }
        ready(result)
    }
}
