use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::constants::ONE_WEEK_MS;
use crate::trend::TrendError;

/// Half-open reporting window `[start, end)` split into one-week buckets.
///
/// Bucket `i` spans `[start + i·W, start + (i+1)·W)`; the last bucket may be a
/// partial week and ends at `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Intervals {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub number_of_days: i64,
    pub number_of_intervals: usize,
}

/// Computes the weekly bucket layout of `[start, end)`.
///
/// `number_of_intervals` is the ceiling of the elapsed time over one week, so
/// a trailing partial week still gets its own bucket and every instant of the
/// window maps to a valid index. Fails with [`TrendError::InvalidRange`] when
/// `end <= start`.
pub fn create_intervals(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Intervals, TrendError> {
    if end <= start {
        return Err(TrendError::InvalidRange { start, end });
    }

    let elapsed = end - start;
    let mut elapsed_ms = elapsed.num_milliseconds();
    if Duration::milliseconds(elapsed_ms) < elapsed {
        elapsed_ms += 1;
    }
    let number_of_days = elapsed.num_days();
    let number_of_intervals = ((elapsed_ms + ONE_WEEK_MS - 1) / ONE_WEEK_MS) as usize;

    Ok(Intervals {
        start,
        end,
        number_of_days,
        number_of_intervals,
    })
}

impl Intervals {
    /// Window of `weeks` whole weeks ending at `end`.
    pub fn trailing_weeks(end: DateTime<Utc>, weeks: u32) -> Result<Self, TrendError> {
        let start = end - Duration::weeks(i64::from(weeks));
        create_intervals(start, end)
    }

    pub fn bucket_start(&self, index: usize) -> DateTime<Utc> {
        self.start + Duration::milliseconds(ONE_WEEK_MS * index as i64)
    }

    pub fn bucket_end(&self, index: usize) -> DateTime<Utc> {
        let end = self.start + Duration::milliseconds(ONE_WEEK_MS * (index as i64 + 1));
        end.min(self.end)
    }

    /// Bucket index of `instant`, or `None` when it lies outside the window.
    pub fn index_of(&self, instant: DateTime<Utc>) -> Option<usize> {
        if instant >= self.end {
            return None;
        }
        let index = crate::trend::bucket::week_index(self.start, instant);
        if index < 0 {
            return None;
        }
        let index = index as usize;
        (index < self.number_of_intervals).then_some(index)
    }

    /// Start of every bucket, in index order.
    pub fn bucket_starts(&self) -> Vec<DateTime<Utc>> {
        (0..self.number_of_intervals)
            .map(|i| self.bucket_start(i))
            .collect()
    }
}
