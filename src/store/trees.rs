pub const BUILD_RUNS: &str = "build_runs";
pub const WORK_ITEM_TRANSITIONS: &str = "work_item_transitions";
pub const COVERAGE_SNAPSHOTS: &str = "coverage_snapshots";
pub const META: &str = "meta";
