use serde::Serialize;

use crate::store::operations::coverage::CoverageSnapshot;
use crate::trend::{
    carry_forward, merge_series, weekly_series, DenseSeries, EventSource, Intervals, LastWins,
    SeriesOptions, TrendError,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineCoverage {
    pub covered_lines: u64,
    pub total_lines: u64,
}

impl LineCoverage {
    pub fn percent(&self) -> f64 {
        if self.total_lines == 0 {
            return 0.0;
        }
        self.covered_lines as f64 * 100.0 / self.total_lines as f64
    }
}

impl From<&CoverageSnapshot> for LineCoverage {
    fn from(snapshot: &CoverageSnapshot) -> Self {
        Self {
            covered_lines: snapshot.covered_lines,
            total_lines: snapshot.total_lines,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    pub per_repository: Vec<DenseSeries<LineCoverage>>,
    pub weekly: Vec<LineCoverage>,
    pub weekly_percent: Vec<f64>,
}

/// Latest coverage snapshot per repository, carried forward, plus the
/// line-weighted coverage across all repositories.
pub async fn coverage_trend<S>(
    source: &S,
    repositories: &[String],
    intervals: &Intervals,
    options: SeriesOptions,
) -> Result<CoverageReport, TrendError>
where
    S: EventSource<Event = CoverageSnapshot>,
{
    let reducer = LastWins(|snapshot: &CoverageSnapshot| LineCoverage::from(snapshot));
    let per_repository =
        weekly_series(source, repositories, intervals, options, &reducer, carry_forward).await?;

    let weekly = merge_series(
        &per_repository,
        intervals.number_of_intervals,
        LineCoverage::default(),
        |acc, repo| LineCoverage {
            covered_lines: acc.covered_lines + repo.covered_lines,
            total_lines: acc.total_lines + repo.total_lines,
        },
    )?
    .points;
    let weekly_percent = weekly.iter().map(LineCoverage::percent).collect();

    Ok(CoverageReport {
        per_repository,
        weekly,
        weekly_percent,
    })
}
