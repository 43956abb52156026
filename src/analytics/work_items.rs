//! Work-item flow: weekly starts, completions and running WIP.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;

use crate::config::ReportConfig;
use crate::store::operations::work_items::WorkItemTransition;
use crate::trend::{
    merge_series, reset_each_week, running_wip, weekly_series, DenseSeries, EventSource, Filtered,
    IdSet, Intervals, SeriesOptions, TrendError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkPhase {
    Started,
    Done,
}

/// Maps project-specific state names onto flow phases, case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct WorkItemStateMap {
    started: HashSet<String>,
    done: HashSet<String>,
}

impl WorkItemStateMap {
    pub fn new<I, J, S, T>(started: I, done: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            started: started.into_iter().map(|s| normalize(s.as_ref())).collect(),
            done: done.into_iter().map(|s| normalize(s.as_ref())).collect(),
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(&config.wip_started_states, &config.wip_done_states)
    }

    /// Done wins when a state is listed in both sets.
    pub fn phase(&self, state: &str) -> Option<WorkPhase> {
        let state = normalize(state);
        if self.done.contains(&state) {
            Some(WorkPhase::Done)
        } else if self.started.contains(&state) {
            Some(WorkPhase::Started)
        } else {
            None
        }
    }
}

fn normalize(state: &str) -> String {
    state.trim().to_lowercase()
}

/// Work items of one group still in progress when the window opens: their
/// latest transition before it maps to [`WorkPhase::Started`].
pub fn open_items(transitions: &[WorkItemTransition], states: &WorkItemStateMap) -> BTreeSet<String> {
    let mut latest: BTreeMap<&str, &WorkItemTransition> = BTreeMap::new();
    for t in transitions {
        let newer = latest.get(t.work_item_id.as_str()).map_or(true, |prev| {
            (t.changed_at, t.id.as_str()) > (prev.changed_at, prev.id.as_str())
        });
        if newer {
            latest.insert(&t.work_item_id, t);
        }
    }
    latest
        .into_iter()
        .filter(|(_, t)| states.phase(&t.state) == Some(WorkPhase::Started))
        .map(|(id, _)| id.to_string())
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyFlow {
    pub started: BTreeSet<String>,
    pub done: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupFlow {
    pub group: String,
    pub started: Vec<usize>,
    pub throughput: Vec<usize>,
    pub wip: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemFlowReport {
    pub per_group: Vec<GroupFlow>,
    pub started: Vec<usize>,
    pub throughput: Vec<usize>,
    pub wip: Vec<usize>,
}

/// Weekly flow per work-item group and across all groups.
///
/// `opening` holds, per group, the items already in progress at the start of
/// the window; they enter the WIP scan in week 0.
pub async fn work_item_flow<S>(
    source: &S,
    groups: &[String],
    intervals: &Intervals,
    options: SeriesOptions,
    states: &WorkItemStateMap,
    opening: &BTreeMap<String, BTreeSet<String>>,
) -> Result<WorkItemFlowReport, TrendError>
where
    S: EventSource<Event = WorkItemTransition>,
{
    let reducer = (
        Filtered::new(
            |t: &WorkItemTransition| states.phase(&t.state) == Some(WorkPhase::Started),
            IdSet(|t: &WorkItemTransition| t.work_item_id.clone()),
        ),
        Filtered::new(
            |t: &WorkItemTransition| states.phase(&t.state) == Some(WorkPhase::Done),
            IdSet(|t: &WorkItemTransition| t.work_item_id.clone()),
        ),
    );
    let raw = weekly_series(source, groups, intervals, options, &reducer, reset_each_week).await?;

    let per_group_series: Vec<DenseSeries<WeeklyFlow>> = raw
        .iter()
        .map(|series| {
            series.map(|(started, done)| WeeklyFlow {
                started: started.clone(),
                done: done.clone(),
            })
        })
        .collect();

    let none_open = BTreeSet::new();
    let mut per_group = Vec::with_capacity(per_group_series.len());
    for series in &per_group_series {
        let open = opening.get(&series.key).unwrap_or(&none_open);
        per_group.push(group_flow(series, open)?);
    }

    let combined = merge_series(
        &per_group_series,
        intervals.number_of_intervals,
        WeeklyFlow::default(),
        |mut acc, week| {
            acc.started.extend(week.started.iter().cloned());
            acc.done.extend(week.done.iter().cloned());
            acc
        },
    )?;
    let open_overall: BTreeSet<String> = opening.values().flatten().cloned().collect();
    let overall = group_flow(
        &DenseSeries {
            key: "all".to_string(),
            points: combined.points,
        },
        &open_overall,
    )?;

    tracing::debug!(
        groups = groups.len(),
        opening = open_overall.len(),
        wip_now = overall.wip.last().copied().unwrap_or_default(),
        "Work item flow computed"
    );

    Ok(WorkItemFlowReport {
        per_group,
        started: overall.started,
        throughput: overall.throughput,
        wip: overall.wip,
    })
}

/// Counts per week plus the WIP scan; `open` items enter the scan in week 0
/// without counting as started that week.
fn group_flow(
    series: &DenseSeries<WeeklyFlow>,
    open: &BTreeSet<String>,
) -> Result<GroupFlow, TrendError> {
    let nothing = BTreeSet::new();
    let entering = series.points.iter().enumerate().map(|(index, week)| {
        let carried = if index == 0 { open } else { &nothing };
        week.started.iter().chain(carried.iter())
    });
    let leaving = series.points.iter().map(|w| &w.done);
    Ok(GroupFlow {
        group: series.key.clone(),
        started: series.points.iter().map(|w| w.started.len()).collect(),
        throughput: series.points.iter().map(|w| w.done.len()).collect(),
        wip: running_wip(entering, leaving)?,
    })
}
