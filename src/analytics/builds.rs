//! Build-definition trends: test adoption and run durations.

use serde::Serialize;

use crate::store::operations::builds::{BuildResult, BuildRun};
use crate::trend::{
    carry_forward, merge_series, reset_each_week, weekly_series, Count, DenseSeries, EventSource,
    Filtered, Intervals, LastWins, SeriesOptions, Sum, TrendError,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelinesWithTestsReport {
    /// Latest known "runs tests" flag per definition, carried across idle weeks.
    pub per_definition: Vec<DenseSeries<bool>>,
    pub weekly_count: Vec<usize>,
}

/// Number of build definitions whose most recent run so far executed tests.
///
/// A definition with no run in a week keeps the flag of its previous run;
/// week 0 falls back to the last run before the window.
pub async fn pipelines_with_tests<S>(
    source: &S,
    definitions: &[String],
    intervals: &Intervals,
    options: SeriesOptions,
) -> Result<PipelinesWithTestsReport, TrendError>
where
    S: EventSource<Event = BuildRun>,
{
    let reducer = LastWins(|run: &BuildRun| run.has_tests);
    let per_definition =
        weekly_series(source, definitions, intervals, options, &reducer, carry_forward).await?;

    let weekly_count = merge_series(
        &per_definition,
        intervals.number_of_intervals,
        0usize,
        |acc, has_tests| acc + usize::from(*has_tests),
    )?
    .points;

    tracing::debug!(
        definitions = definitions.len(),
        latest = weekly_count.last().copied().unwrap_or_default(),
        "Pipelines-with-tests trend computed"
    );

    Ok(PipelinesWithTestsReport {
        per_definition,
        weekly_count,
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyBuildStats {
    pub runs: u64,
    pub failed_runs: u64,
    pub total_duration_ms: f64,
}

impl WeeklyBuildStats {
    pub fn average_duration_ms(&self) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        self.total_duration_ms / self.runs as f64
    }

    pub fn failure_rate(&self) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        self.failed_runs as f64 / self.runs as f64
    }

    fn combine(self, other: &Self) -> Self {
        Self {
            runs: self.runs + other.runs,
            failed_runs: self.failed_runs + other.failed_runs,
            total_duration_ms: self.total_duration_ms + other.total_duration_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildDurationReport {
    pub per_definition: Vec<DenseSeries<WeeklyBuildStats>>,
    pub weekly: Vec<WeeklyBuildStats>,
    pub average_duration_ms: Vec<f64>,
    pub failure_rate: Vec<f64>,
}

/// Per-week run count, failures and duration; idle weeks are zero.
pub async fn build_duration<S>(
    source: &S,
    definitions: &[String],
    intervals: &Intervals,
    options: SeriesOptions,
) -> Result<BuildDurationReport, TrendError>
where
    S: EventSource<Event = BuildRun>,
{
    let reducer = (
        Count,
        Filtered::new(|run: &BuildRun| run.result == BuildResult::Failed, Count),
        Sum(|run: &BuildRun| run.duration_ms as f64),
    );
    let raw = weekly_series(source, definitions, intervals, options, &reducer, reset_each_week).await?;

    let per_definition: Vec<DenseSeries<WeeklyBuildStats>> = raw
        .iter()
        .map(|series| {
            series.map(|&(runs, failed_runs, total_duration_ms)| WeeklyBuildStats {
                runs,
                failed_runs,
                total_duration_ms,
            })
        })
        .collect();

    let weekly = merge_series(
        &per_definition,
        intervals.number_of_intervals,
        WeeklyBuildStats::default(),
        WeeklyBuildStats::combine,
    )?
    .points;
    let average_duration_ms = weekly.iter().map(WeeklyBuildStats::average_duration_ms).collect();
    let failure_rate = weekly.iter().map(WeeklyBuildStats::failure_rate).collect();

    Ok(BuildDurationReport {
        per_definition,
        weekly,
        average_duration_ms,
        failure_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_week_has_zero_rates() {
        let idle = WeeklyBuildStats::default();
        assert_eq!(idle.average_duration_ms(), 0.0);
        assert_eq!(idle.failure_rate(), 0.0);
    }

    #[test]
    fn combined_stats_weight_by_runs() {
        let a = WeeklyBuildStats {
            runs: 3,
            failed_runs: 1,
            total_duration_ms: 600.0,
        };
        let b = WeeklyBuildStats {
            runs: 1,
            failed_runs: 1,
            total_duration_ms: 200.0,
        };
        let both = a.combine(&b);
        assert_eq!(both.runs, 4);
        assert_eq!(both.average_duration_ms(), 200.0);
        assert_eq!(both.failure_rate(), 0.5);
    }
}
