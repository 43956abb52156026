use chrono::{DateTime, Duration, TimeZone, Utc};

use devops_trends::store::operations::builds::{BuildResult, BuildRun};
use devops_trends::store::operations::coverage::CoverageSnapshot;
use devops_trends::store::operations::work_items::WorkItemTransition;
use devops_trends::store::Store;

pub fn setup_store(db_name: &str) -> (tempfile::TempDir, Store) {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let db_path = temp_dir.path().join(db_name);
    let store = Store::open(db_path.to_str().expect("db path")).expect("open store");
    store.run_migrations().expect("migrations");
    (temp_dir, store)
}

/// Monday 2024-01-01, the start of every test window.
pub fn window_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn at_day(day: i64) -> DateTime<Utc> {
    window_start() + Duration::days(day)
}

pub fn seed_build(
    store: &Store,
    definition: &str,
    result: BuildResult,
    duration_ms: i64,
    has_tests: bool,
    day: i64,
) -> BuildRun {
    let run = BuildRun::new(definition, result, duration_ms, has_tests, at_day(day));
    store.record_build_run(&run).expect("record build run");
    run
}

pub fn seed_transition(store: &Store, item: &str, group: &str, state: &str, day: i64) {
    let transition = WorkItemTransition::new(item, group, state, at_day(day));
    store
        .record_work_item_transition(&transition)
        .expect("record transition");
}

pub fn seed_coverage(store: &Store, repository: &str, covered: u64, total: u64, day: i64) {
    let snapshot = CoverageSnapshot::new(repository, covered, total, at_day(day));
    store
        .record_coverage_snapshot(&snapshot)
        .expect("record coverage");
}
