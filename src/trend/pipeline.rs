//! Source → bucket → reduce → fill, once per series key.

use chrono::{DateTime, Utc};
use futures::future::try_join_all;

use crate::trend::bucket::bucket_by_week;
use crate::trend::fill::make_continuous;
use crate::trend::interval::Intervals;
use crate::trend::reducer::{reduce_buckets, Reducer, TimedEvent};
use crate::trend::series::DenseSeries;
use crate::trend::source::EventSource;
use crate::trend::TrendError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeriesOptions {
    /// Events before this instant are ignored, including the bucket-0 seed.
    pub ignore_before: Option<DateTime<Utc>>,
}

/// Builds one dense weekly series per key.
///
/// Keys are processed concurrently on the calling task; the result keeps the
/// order of `keys`. The first failure aborts the whole computation.
pub async fn weekly_series<S, R, D>(
    source: &S,
    keys: &[String],
    intervals: &Intervals,
    options: SeriesOptions,
    reducer: &R,
    make_default: D,
) -> Result<Vec<DenseSeries<R::Output>>, TrendError>
where
    S: EventSource,
    R: Reducer<S::Event>,
    D: Fn(Option<&R::Output>) -> R::Output,
{
    let make_default = &make_default;
    let tasks = keys
        .iter()
        .map(|key| series_for_key(source, key, intervals, options, reducer, make_default));
    let series = try_join_all(tasks).await?;

    tracing::debug!(
        series = series.len(),
        buckets = intervals.number_of_intervals,
        start = %intervals.start,
        "Weekly series computed"
    );
    Ok(series)
}

async fn series_for_key<S, R, D>(
    source: &S,
    key: &str,
    intervals: &Intervals,
    options: SeriesOptions,
    reducer: &R,
    make_default: &D,
) -> Result<DenseSeries<R::Output>, TrendError>
where
    S: EventSource,
    R: Reducer<S::Event>,
    D: Fn(Option<&R::Output>) -> R::Output,
{
    let events = source
        .events_in_range(key, intervals.start, intervals.end)
        .await?;
    let buckets = bucket_by_week(&events, intervals, options.ignore_before);
    let sparse = reduce_buckets(key, &buckets, reducer);

    tracing::trace!(
        series = key,
        events = events.len(),
        populated = sparse.len(),
        "Reduced weekly buckets"
    );

    make_continuous(
        sparse,
        intervals.number_of_intervals,
        || async {
            let Some(older) = source.latest_before(key, intervals.start).await? else {
                return Ok(None);
            };
            if options
                .ignore_before
                .is_some_and(|cutoff| older.occurred_at() < cutoff)
            {
                return Ok(None);
            }
            Ok(reducer.reduce(&[&older]))
        },
        make_default,
    )
    .await
}
