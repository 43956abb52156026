use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::source::StoredEvents;
use crate::store::{Store, StoreError};
use crate::trend::TimedEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildResult {
    Succeeded,
    PartiallySucceeded,
    Failed,
    Canceled,
}

/// A finished pipeline run of one build definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRun {
    pub id: String,
    pub definition_id: String,
    pub result: BuildResult,
    pub duration_ms: i64,
    pub has_tests: bool,
    pub finished_at: DateTime<Utc>,
}

impl BuildRun {
    pub fn new(
        definition_id: impl Into<String>,
        result: BuildResult,
        duration_ms: i64,
        has_tests: bool,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            definition_id: definition_id.into(),
            result,
            duration_ms,
            has_tests,
            finished_at,
        }
    }
}

impl TimedEvent for BuildRun {
    fn occurred_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    fn event_id(&self) -> &str {
        &self.id
    }
}

impl Store {
    pub fn record_build_run(&self, run: &BuildRun) -> Result<(), StoreError> {
        if run.duration_ms < 0 {
            return Err(StoreError::Validation(format!(
                "build {} has negative duration {}",
                run.id, run.duration_ms
            )));
        }
        Self::put_event(
            &self.build_runs,
            &run.definition_id,
            run.finished_at.timestamp_millis(),
            &run.id,
            run,
        )
    }

    pub fn build_runs_in_range(
        &self,
        definition_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BuildRun>, StoreError> {
        Self::scan_range(
            &self.build_runs,
            definition_id,
            start.timestamp_millis(),
            end.timestamp_millis(),
        )
    }

    pub fn latest_build_run_before(
        &self,
        definition_id: &str,
        before: DateTime<Utc>,
    ) -> Result<Option<BuildRun>, StoreError> {
        Self::last_before(&self.build_runs, definition_id, before.timestamp_millis())
    }

    pub fn build_definitions(&self) -> Result<Vec<String>, StoreError> {
        Self::list_series_keys(&self.build_runs)
    }

    pub fn build_runs_source(&self) -> StoredEvents<'_, BuildRun> {
        StoredEvents::new(&self.build_runs)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn range_and_latest_before() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let old = BuildRun::new("ci", BuildResult::Succeeded, 1_000, false, t0 - Duration::days(3));
        let inside = BuildRun::new("ci", BuildResult::Failed, 2_000, true, t0 + Duration::days(1));
        let other = BuildRun::new("nightly", BuildResult::Succeeded, 5_000, true, t0);
        for run in [&old, &inside, &other] {
            store.record_build_run(run).unwrap();
        }

        let in_range = store
            .build_runs_in_range("ci", t0, t0 + Duration::days(7))
            .unwrap();
        assert_eq!(in_range, vec![inside.clone()]);

        let latest = store.latest_build_run_before("ci", t0).unwrap();
        assert_eq!(latest, Some(old));
        assert_eq!(store.latest_build_run_before("nightly", t0).unwrap(), None);

        assert_eq!(store.build_definitions().unwrap(), vec!["ci", "nightly"]);
    }

    #[test]
    fn rejects_negative_duration() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        let run = BuildRun::new("ci", BuildResult::Succeeded, -1, false, Utc::now());
        assert!(matches!(
            store.record_build_run(&run),
            Err(StoreError::Validation(_))
        ));
    }
}
