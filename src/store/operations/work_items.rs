use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::source::StoredEvents;
use crate::store::{Store, StoreError};
use crate::trend::TimedEvent;

/// A work item entering a new state. `group` is the reporting bucket the item
/// belongs to (work item type, area path, ...) and is the series key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemTransition {
    pub id: String,
    pub work_item_id: String,
    pub group: String,
    pub state: String,
    pub changed_at: DateTime<Utc>,
}

impl WorkItemTransition {
    pub fn new(
        work_item_id: impl Into<String>,
        group: impl Into<String>,
        state: impl Into<String>,
        changed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            work_item_id: work_item_id.into(),
            group: group.into(),
            state: state.into(),
            changed_at,
        }
    }
}

impl TimedEvent for WorkItemTransition {
    fn occurred_at(&self) -> DateTime<Utc> {
        self.changed_at
    }

    fn event_id(&self) -> &str {
        &self.id
    }
}

impl Store {
    pub fn record_work_item_transition(
        &self,
        transition: &WorkItemTransition,
    ) -> Result<(), StoreError> {
        if transition.state.trim().is_empty() {
            return Err(StoreError::Validation(format!(
                "work item {} transition has no state",
                transition.work_item_id
            )));
        }
        Self::put_event(
            &self.work_item_transitions,
            &transition.group,
            transition.changed_at.timestamp_millis(),
            &transition.id,
            transition,
        )
    }

    pub fn work_item_transitions_in_range(
        &self,
        group: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<WorkItemTransition>, StoreError> {
        Self::scan_range(
            &self.work_item_transitions,
            group,
            start.timestamp_millis(),
            end.timestamp_millis(),
        )
    }

    pub fn work_item_groups(&self) -> Result<Vec<String>, StoreError> {
        Self::list_series_keys(&self.work_item_transitions)
    }

    pub fn work_item_source(&self) -> StoredEvents<'_, WorkItemTransition> {
        StoredEvents::new(&self.work_item_transitions)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn transitions_are_grouped_and_time_ordered() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        let t0 = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();

        let later = WorkItemTransition::new("42", "Bug", "Closed", t0 + Duration::days(2));
        let earlier = WorkItemTransition::new("42", "Bug", "Active", t0);
        let feature = WorkItemTransition::new("7", "Feature", "Active", t0);
        store.record_work_item_transition(&later).unwrap();
        store.record_work_item_transition(&earlier).unwrap();
        store.record_work_item_transition(&feature).unwrap();

        let bugs = store
            .work_item_transitions_in_range("Bug", t0, t0 + Duration::days(7))
            .unwrap();
        let states: Vec<&str> = bugs.iter().map(|t| t.state.as_str()).collect();
        assert_eq!(states, vec!["Active", "Closed"]);
        assert_eq!(store.work_item_groups().unwrap(), vec!["Bug", "Feature"]);
    }

    #[test]
    fn rejects_blank_state() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        let blank = WorkItemTransition::new("1", "Bug", "  ", Utc::now());
        assert!(store.record_work_item_transition(&blank).is_err());
    }
}
