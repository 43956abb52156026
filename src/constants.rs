/// One day in milliseconds
pub const ONE_DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Bucket width: one week in milliseconds
pub const ONE_WEEK_MS: i64 = 7 * ONE_DAY_MS;

/// Default report window when `REPORT_WEEKS` is not set
pub const DEFAULT_REPORT_WEEKS: u32 = 12;

/// Upper bound for `REPORT_WEEKS`, roughly two years of weekly buckets
pub const MAX_REPORT_WEEKS: u32 = 104;

/// Work-item states counted as "in progress" when no mapping is configured
pub const DEFAULT_WIP_STARTED_STATES: &[&str] = &["Active", "In Progress", "Committed"];

/// Work-item states counted as "done" when no mapping is configured
pub const DEFAULT_WIP_DONE_STATES: &[&str] = &["Closed", "Done", "Resolved", "Removed"];

/// Separator between key components in store keys
pub const KEY_SEPARATOR: char = ':';
