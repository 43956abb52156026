use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::constants::ONE_WEEK_MS;
use crate::trend::interval::Intervals;
use crate::trend::reducer::TimedEvent;

/// Events of one series grouped by bucket index, ascending.
pub type WeekBuckets<'a, E> = BTreeMap<usize, Vec<&'a E>>;

/// Zero-based week index of `event_time` relative to `start`.
///
/// Floor division, so instants before `start` give negative indices, down to
/// the nanosecond.
pub fn week_index(start: DateTime<Utc>, event_time: DateTime<Utc>) -> i64 {
    floor_millis(event_time - start).div_euclid(ONE_WEEK_MS)
}

/// Whole milliseconds of `elapsed`, rounded toward negative infinity.
fn floor_millis(elapsed: Duration) -> i64 {
    let ms = elapsed.num_milliseconds();
    if Duration::milliseconds(ms) > elapsed {
        ms - 1
    } else {
        ms
    }
}

/// Assigns events to the buckets of `intervals`.
///
/// Events outside the window, or older than `ignore_before`, are dropped.
/// Within a bucket events keep their input order.
pub fn bucket_by_week<'a, E: TimedEvent>(
    events: &'a [E],
    intervals: &Intervals,
    ignore_before: Option<DateTime<Utc>>,
) -> WeekBuckets<'a, E> {
    let mut buckets: WeekBuckets<'a, E> = BTreeMap::new();
    for event in events {
        let at = event.occurred_at();
        if ignore_before.is_some_and(|cutoff| at < cutoff) {
            continue;
        }
        if let Some(index) = intervals.index_of(at) {
            buckets.entry(index).or_default().push(event);
        }
    }
    buckets
}

/// Like [`bucket_by_week`], but groups by series key first.
pub fn group_by_key<'a, E, F>(
    events: &'a [E],
    key_fn: F,
    intervals: &Intervals,
    ignore_before: Option<DateTime<Utc>>,
) -> BTreeMap<String, WeekBuckets<'a, E>>
where
    E: TimedEvent,
    F: Fn(&E) -> String,
{
    let mut grouped: BTreeMap<String, WeekBuckets<'a, E>> = BTreeMap::new();
    for event in events {
        let at = event.occurred_at();
        if ignore_before.is_some_and(|cutoff| at < cutoff) {
            continue;
        }
        let Some(index) = intervals.index_of(at) else {
            continue;
        };
        grouped
            .entry(key_fn(event))
            .or_default()
            .entry(index)
            .or_default()
            .push(event);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trend::interval::create_intervals;
    use chrono::{Duration, TimeZone};

    struct Ping {
        id: String,
        group: &'static str,
        at: DateTime<Utc>,
    }

    impl TimedEvent for Ping {
        fn occurred_at(&self) -> DateTime<Utc> {
            self.at
        }

        fn event_id(&self) -> &str {
            &self.id
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn ping(id: &str, group: &'static str, at: DateTime<Utc>) -> Ping {
        Ping {
            id: id.to_string(),
            group,
            at,
        }
    }

    #[test]
    fn week_boundary_is_half_open() {
        let s = start();
        assert_eq!(week_index(s, s), 0);
        assert_eq!(week_index(s, s + Duration::days(7) - Duration::milliseconds(1)), 0);
        assert_eq!(week_index(s, s + Duration::days(7)), 1);
    }

    #[test]
    fn pre_range_index_is_negative() {
        let s = start();
        assert_eq!(week_index(s, s - Duration::milliseconds(1)), -1);
        assert_eq!(week_index(s, s - Duration::days(7)), -1);
        assert_eq!(week_index(s, s - Duration::days(8)), -2);
    }

    #[test]
    fn sub_millisecond_offsets_floor() {
        let s = start();
        assert_eq!(week_index(s, s - Duration::nanoseconds(1)), -1);
        assert_eq!(week_index(s, s - Duration::microseconds(999)), -1);
        assert_eq!(week_index(s, s + Duration::nanoseconds(1)), 0);
        assert_eq!(week_index(s, s + Duration::days(7) - Duration::nanoseconds(1)), 0);

        let iv = create_intervals(s, s + Duration::days(7)).unwrap();
        assert_eq!(iv.index_of(s - Duration::nanoseconds(1)), None);
        assert_eq!(iv.index_of(s), Some(0));
    }

    #[test]
    fn drops_out_of_window_and_cutoff_events() {
        let s = start();
        let iv = create_intervals(s, s + Duration::days(14)).unwrap();
        let events = vec![
            ping("a", "x", s - Duration::days(1)),
            ping("b", "x", s + Duration::days(1)),
            ping("c", "x", s + Duration::days(2)),
            ping("d", "x", s + Duration::days(9)),
            ping("e", "x", s + Duration::days(14)),
        ];

        let buckets = bucket_by_week(&events, &iv, None);
        assert_eq!(buckets.len(), 2);
        let first: Vec<&str> = buckets[&0].iter().map(|e| e.event_id()).collect();
        assert_eq!(first, vec!["b", "c"]);
        assert_eq!(buckets[&1].len(), 1);

        let cut = bucket_by_week(&events, &iv, Some(s + Duration::days(2)));
        assert_eq!(cut[&0].len(), 1);
        assert_eq!(cut[&0][0].event_id(), "c");
    }

    #[test]
    fn groups_by_key_then_week() {
        let s = start();
        let iv = create_intervals(s, s + Duration::days(21)).unwrap();
        let events = vec![
            ping("a", "x", s + Duration::days(1)),
            ping("b", "y", s + Duration::days(8)),
            ping("c", "x", s + Duration::days(15)),
        ];

        let grouped = group_by_key(&events, |e| e.group.to_string(), &iv, None);
        assert_eq!(grouped.keys().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(grouped["x"].keys().copied().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(grouped["y"].keys().copied().collect::<Vec<_>>(), vec![1]);
    }
}
