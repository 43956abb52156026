//! Continuity fill: turns a sparse series into a dense one.
//!
//! Bucket 0 is seeded from the latest aggregate strictly before the window
//! when the series has no entry there. Every later gap is derived from the
//! nearest preceding bucket only, so the scan runs strictly in index order.

use std::future::Future;

use crate::trend::series::{DenseSeries, SparseSeries};
use crate::trend::TrendError;

/// Fills `series` to exactly `number_of_buckets` points.
///
/// `fetch_older` is called at most once, and only when bucket 0 is missing.
/// `make_default(None)` must yield the zero aggregate; gaps receive
/// `make_default(Some(last_known))`. An error from `fetch_older` fails the
/// whole fill.
pub async fn make_continuous<T, F, Fut, D>(
    series: SparseSeries<T>,
    number_of_buckets: usize,
    fetch_older: F,
    make_default: D,
) -> Result<DenseSeries<T>, TrendError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<T>, TrendError>>,
    D: Fn(Option<&T>) -> T,
{
    let (key, entries) = series.into_parts();

    if let Some((last_index, _)) = entries.last() {
        if *last_index >= number_of_buckets {
            return Err(TrendError::invariant(
                &key,
                format!("bucket index {last_index} outside window of {number_of_buckets}"),
            ));
        }
    }
    if number_of_buckets == 0 {
        return Ok(DenseSeries {
            key,
            points: Vec::new(),
        });
    }

    let has_first = entries.first().is_some_and(|(index, _)| *index == 0);
    let mut seed = if has_first {
        None
    } else {
        let older = fetch_older().await?;
        tracing::debug!(
            series = %key,
            seeded_from_history = older.is_some(),
            "Seeding bucket 0"
        );
        Some(make_default(older.as_ref()))
    };

    // Entries are strictly ascending, so one peek per bucket suffices.
    let mut points: Vec<T> = Vec::with_capacity(number_of_buckets);
    let mut known = entries.into_iter().peekable();

    for index in 0..number_of_buckets {
        let explicit = known.next_if(|(next, _)| *next == index).map(|(_, agg)| agg);

        let point = match explicit {
            Some(agg) => agg,
            None => match seed.take() {
                Some(seeded) if index == 0 => seeded,
                _ => make_default(points.last()),
            },
        };
        points.push(point);
    }

    Ok(DenseSeries { key, points })
}

/// Gap filler that carries the last known aggregate forward unchanged.
pub fn carry_forward<T: Clone + Default>(last: Option<&T>) -> T {
    last.cloned().unwrap_or_default()
}

/// Gap filler for per-week quantities: an empty week is the zero aggregate.
pub fn reset_each_week<T: Default>(_last: Option<&T>) -> T {
    T::default()
}
