use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::source::StoredEvents;
use crate::store::{Store, StoreError};
use crate::trend::TimedEvent;

/// Line coverage of one repository as reported by a single analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageSnapshot {
    pub id: String,
    pub repository: String,
    pub covered_lines: u64,
    pub total_lines: u64,
    pub captured_at: DateTime<Utc>,
}

impl CoverageSnapshot {
    pub fn new(
        repository: impl Into<String>,
        covered_lines: u64,
        total_lines: u64,
        captured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            repository: repository.into(),
            covered_lines,
            total_lines,
            captured_at,
        }
    }
}

impl TimedEvent for CoverageSnapshot {
    fn occurred_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    fn event_id(&self) -> &str {
        &self.id
    }
}

impl Store {
    pub fn record_coverage_snapshot(&self, snapshot: &CoverageSnapshot) -> Result<(), StoreError> {
        if snapshot.covered_lines > snapshot.total_lines {
            return Err(StoreError::Validation(format!(
                "coverage snapshot {} covers {} of {} lines",
                snapshot.id, snapshot.covered_lines, snapshot.total_lines
            )));
        }
        Self::put_event(
            &self.coverage_snapshots,
            &snapshot.repository,
            snapshot.captured_at.timestamp_millis(),
            &snapshot.id,
            snapshot,
        )
    }

    pub fn latest_coverage_before(
        &self,
        repository: &str,
        before: DateTime<Utc>,
    ) -> Result<Option<CoverageSnapshot>, StoreError> {
        Self::last_before(
            &self.coverage_snapshots,
            repository,
            before.timestamp_millis(),
        )
    }

    pub fn coverage_repositories(&self) -> Result<Vec<String>, StoreError> {
        Self::list_series_keys(&self.coverage_snapshots)
    }

    pub fn coverage_source(&self) -> StoredEvents<'_, CoverageSnapshot> {
        StoredEvents::new(&self.coverage_snapshots)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn latest_before_ignores_the_boundary_instant() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        let t0 = Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap();

        let before = CoverageSnapshot::new("api", 10, 100, t0 - Duration::hours(1));
        let at = CoverageSnapshot::new("api", 20, 100, t0);
        store.record_coverage_snapshot(&before).unwrap();
        store.record_coverage_snapshot(&at).unwrap();

        assert_eq!(store.latest_coverage_before("api", t0).unwrap(), Some(before));
    }

    #[test]
    fn rejects_overcounted_lines() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        let bad = CoverageSnapshot::new("api", 11, 10, Utc::now());
        assert!(matches!(
            store.record_coverage_snapshot(&bad),
            Err(StoreError::Validation(_))
        ));
    }
}
