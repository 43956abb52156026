use std::env;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::constants::{
    DEFAULT_REPORT_WEEKS, DEFAULT_WIP_DONE_STATES, DEFAULT_WIP_STARTED_STATES, MAX_REPORT_WEEKS,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub sled_path: String,
    pub report: ReportConfig,
}

/// Project-specific report rules, passed explicitly into the aggregations.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub weeks: u32,
    /// Events before this instant never contribute to a report.
    pub ignore_before: Option<DateTime<Utc>>,
    pub wip_started_states: Vec<String>,
    pub wip_done_states: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            weeks: DEFAULT_REPORT_WEEKS,
            ignore_before: None,
            wip_started_states: to_owned_list(DEFAULT_WIP_STARTED_STATES),
            wip_done_states: to_owned_list(DEFAULT_WIP_DONE_STATES),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let weeks = env_or_parse("REPORT_WEEKS", DEFAULT_REPORT_WEEKS);
        Self {
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            sled_path: env_or("SLED_PATH", "./data/trends.sled"),
            report: ReportConfig {
                weeks: weeks.clamp(1, MAX_REPORT_WEEKS),
                ignore_before: env_or_datetime("REPORT_IGNORE_BEFORE"),
                wip_started_states: env_or_list("WIP_STARTED_STATES", DEFAULT_WIP_STARTED_STATES),
                wip_done_states: env_or_list("WIP_DONE_STATES", DEFAULT_WIP_DONE_STATES),
            },
        }
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

/// Comma-separated list; blank entries are dropped, an empty result falls back.
pub fn env_or_list(key: &str, default: &[&str]) -> Vec<String> {
    let parsed: Vec<String> = match env::var(key) {
        Ok(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Err(_) => Vec::new(),
    };
    if parsed.is_empty() {
        to_owned_list(default)
    } else {
        parsed
    }
}

/// RFC 3339 instant, `None` when unset or unparsable.
pub fn env_or_datetime(key: &str) -> Option<DateTime<Utc>> {
    let raw = env::var(key).ok()?;
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            tracing::warn!(key, value = %raw, error = %e, "Failed to parse env datetime, ignoring");
            None
        }
    }
}
