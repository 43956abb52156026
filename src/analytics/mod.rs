//! Project-level reports built on the weekly trend core.

pub mod builds;
pub mod coverage;
pub mod work_items;

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::ReportConfig;
use crate::store::Store;
use crate::trend::{Intervals, SeriesOptions, TrendError};

use builds::{BuildDurationReport, PipelinesWithTestsReport};
use coverage::CoverageReport;
use work_items::{WorkItemFlowReport, WorkItemStateMap};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTrends {
    pub window: Intervals,
    pub week_starts: Vec<DateTime<Utc>>,
    pub pipelines_with_tests: PipelinesWithTestsReport,
    pub build_duration: BuildDurationReport,
    pub work_item_flow: WorkItemFlowReport,
    pub coverage: CoverageReport,
}

impl ProjectTrends {
    /// Computes every report over `intervals` for all series in the store.
    pub async fn collect(
        store: &Store,
        config: &ReportConfig,
        intervals: &Intervals,
    ) -> Result<Self, TrendError> {
        let options = SeriesOptions {
            ignore_before: config.ignore_before,
        };
        let states = WorkItemStateMap::from_config(config);

        let definitions = store.build_definitions().map_err(TrendError::fetch)?;
        let groups = store.work_item_groups().map_err(TrendError::fetch)?;
        let repositories = store.coverage_repositories().map_err(TrendError::fetch)?;
        let opening = opening_work_items(store, &groups, intervals, options, &states)?;

        tracing::info!(
            start = %intervals.start,
            weeks = intervals.number_of_intervals,
            definitions = definitions.len(),
            groups = groups.len(),
            repositories = repositories.len(),
            "Collecting project trends"
        );

        let build_source = store.build_runs_source();
        let work_item_source = store.work_item_source();
        let coverage_source = store.coverage_source();

        let (pipelines_with_tests, build_duration, work_item_flow, coverage) = tokio::try_join!(
            builds::pipelines_with_tests(&build_source, &definitions, intervals, options),
            builds::build_duration(&build_source, &definitions, intervals, options),
            work_items::work_item_flow(
                &work_item_source,
                &groups,
                intervals,
                options,
                &states,
                &opening,
            ),
            coverage::coverage_trend(&coverage_source, &repositories, intervals, options),
        )?;

        Ok(Self {
            window: *intervals,
            week_starts: intervals.bucket_starts(),
            pipelines_with_tests,
            build_duration,
            work_item_flow,
            coverage,
        })
    }
}

/// Items of each group already in progress when the window opens.
fn opening_work_items(
    store: &Store,
    groups: &[String],
    intervals: &Intervals,
    options: SeriesOptions,
    states: &WorkItemStateMap,
) -> Result<BTreeMap<String, BTreeSet<String>>, TrendError> {
    let history_start = options.ignore_before.unwrap_or(DateTime::<Utc>::MIN_UTC);
    let mut opening = BTreeMap::new();
    for group in groups {
        let history = store
            .work_item_transitions_in_range(group, history_start, intervals.start)
            .map_err(TrendError::fetch)?;
        let open = work_items::open_items(&history, states);
        if !open.is_empty() {
            opening.insert(group.clone(), open);
        }
    }
    Ok(opening)
}
