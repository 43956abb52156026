use std::collections::BTreeMap;
use std::future::{ready, Future};
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};

use devops_trends::trend::{EventSource, TimedEvent, TrendError};

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub id: String,
    pub key: String,
    pub value: u64,
    pub at: DateTime<Utc>,
}

impl Sample {
    pub fn new(id: &str, key: &str, value: u64, at: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            key: key.to_string(),
            value,
            at,
        }
    }
}

impl TimedEvent for Sample {
    fn occurred_at(&self) -> DateTime<Utc> {
        self.at
    }

    fn event_id(&self) -> &str {
        &self.id
    }
}

/// In-memory event source that counts its queries and can be made to fail.
#[derive(Debug, Default)]
pub struct MemorySource {
    events: BTreeMap<String, Vec<Sample>>,
    pub range_calls: AtomicUsize,
    pub latest_calls: AtomicUsize,
    pub offline: bool,
}

impl MemorySource {
    pub fn new(samples: Vec<Sample>) -> Self {
        let mut events: BTreeMap<String, Vec<Sample>> = BTreeMap::new();
        for sample in samples {
            events.entry(sample.key.clone()).or_default().push(sample);
        }
        for list in events.values_mut() {
            list.sort_by(|a, b| a.at.cmp(&b.at).then_with(|| a.id.cmp(&b.id)));
        }
        Self {
            events,
            ..Self::default()
        }
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    fn check_online(&self) -> Result<(), TrendError> {
        if self.offline {
            return Err(TrendError::fetch(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "event store offline",
            )));
        }
        Ok(())
    }
}

impl EventSource for MemorySource {
    type Event = Sample;

    fn events_in_range(
        &self,
        key: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Sample>, TrendError>> + Send {
        self.range_calls.fetch_add(1, Ordering::SeqCst);
        let result = self.check_online().map(|_| {
            self.events
                .get(key)
                .map(|list| {
                    list.iter()
                        .filter(|s| s.at >= start && s.at < end)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        });
        ready(result)
    }

    fn latest_before(
        &self,
        key: &str,
        before: DateTime<Utc>,
    ) -> impl Future<Output = Result<Option<Sample>, TrendError>> + Send {
        self.latest_calls.fetch_add(1, Ordering::SeqCst);
        let result = self.check_online().map(|_| {
            self.events
                .get(key)
                .and_then(|list| list.iter().filter(|s| s.at < before).last().cloned())
        });
        ready(result)
    }
}
