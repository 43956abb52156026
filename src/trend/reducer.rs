//! Per-bucket reducers.
//!
//! A reducer folds the events of one `(series, bucket)` pair into one
//! aggregate. Reducers never produce an aggregate for an empty bucket, so
//! buckets without matching events stay absent from the sparse series.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::trend::bucket::WeekBuckets;
use crate::trend::series::SparseSeries;

/// An immutable, timestamped event.
pub trait TimedEvent {
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Unique id, used as the tie-break when two events share a timestamp.
    fn event_id(&self) -> &str;
}

pub trait Reducer<E> {
    type Output;

    /// Folds `events` into one aggregate; `None` when nothing contributes.
    fn reduce(&self, events: &[&E]) -> Option<Self::Output>;
}

/// Number of events.
#[derive(Debug, Clone, Copy, Default)]
pub struct Count;

impl<E> Reducer<E> for Count {
    type Output = u64;

    fn reduce(&self, events: &[&E]) -> Option<u64> {
        if events.is_empty() {
            return None;
        }
        Some(events.len() as u64)
    }
}

/// Union of an identifying field across events.
#[derive(Debug, Clone, Copy)]
pub struct IdSet<F>(pub F);

impl<E, F> Reducer<E> for IdSet<F>
where
    F: Fn(&E) -> String,
{
    type Output = BTreeSet<String>;

    fn reduce(&self, events: &[&E]) -> Option<BTreeSet<String>> {
        if events.is_empty() {
            return None;
        }
        Some(events.iter().map(|e| (self.0)(*e)).collect())
    }
}

/// Sum of a numeric field.
#[derive(Debug, Clone, Copy)]
pub struct Sum<F>(pub F);

impl<E, F> Reducer<E> for Sum<F>
where
    F: Fn(&E) -> f64,
{
    type Output = f64;

    fn reduce(&self, events: &[&E]) -> Option<f64> {
        if events.is_empty() {
            return None;
        }
        Some(events.iter().map(|e| (self.0)(*e)).sum())
    }
}

/// Field of the most recent event, ordered by `(occurred_at, event_id)`.
#[derive(Debug, Clone, Copy)]
pub struct LastWins<F>(pub F);

impl<E, T, F> Reducer<E> for LastWins<F>
where
    E: TimedEvent,
    F: Fn(&E) -> T,
{
    type Output = T;

    fn reduce(&self, events: &[&E]) -> Option<T> {
        events
            .iter()
            .max_by(|a, b| {
                a.occurred_at()
                    .cmp(&b.occurred_at())
                    .then_with(|| a.event_id().cmp(b.event_id()))
            })
            .map(|latest| (self.0)(*latest))
    }
}

/// Runs `inner` over the events matching `predicate` only.
#[derive(Debug, Clone, Copy)]
pub struct Filtered<P, R> {
    pub predicate: P,
    pub inner: R,
}

impl<P, R> Filtered<P, R> {
    pub fn new(predicate: P, inner: R) -> Self {
        Self { predicate, inner }
    }
}

impl<E, P, R> Reducer<E> for Filtered<P, R>
where
    P: Fn(&E) -> bool,
    R: Reducer<E>,
{
    type Output = R::Output;

    fn reduce(&self, events: &[&E]) -> Option<R::Output> {
        let matching: Vec<&E> = events
            .iter()
            .copied()
            .filter(|e| (self.predicate)(*e))
            .collect();
        self.inner.reduce(&matching)
    }
}

// Composite reducers: `None` only when every component is `None`; a component
// with nothing to contribute falls back to its default.
impl<E, A, B> Reducer<E> for (A, B)
where
    A: Reducer<E>,
    B: Reducer<E>,
    A::Output: Default,
    B::Output: Default,
{
    type Output = (A::Output, B::Output);

    fn reduce(&self, events: &[&E]) -> Option<Self::Output> {
        match (self.0.reduce(events), self.1.reduce(events)) {
            (None, None) => None,
            (a, b) => Some((a.unwrap_or_default(), b.unwrap_or_default())),
        }
    }
}

impl<E, A, B, C> Reducer<E> for (A, B, C)
where
    A: Reducer<E>,
    B: Reducer<E>,
    C: Reducer<E>,
    A::Output: Default,
    B::Output: Default,
    C::Output: Default,
{
    type Output = (A::Output, B::Output, C::Output);

    fn reduce(&self, events: &[&E]) -> Option<Self::Output> {
        match (
            self.0.reduce(events),
            self.1.reduce(events),
            self.2.reduce(events),
        ) {
            (None, None, None) => None,
            (a, b, c) => Some((
                a.unwrap_or_default(),
                b.unwrap_or_default(),
                c.unwrap_or_default(),
            )),
        }
    }
}

/// Folds every bucket of one series; buckets that reduce to `None` are left out.
pub fn reduce_buckets<E, R>(key: &str, buckets: &WeekBuckets<'_, E>, reducer: &R) -> SparseSeries<R::Output>
where
    R: Reducer<E>,
{
    let entries = buckets
        .iter()
        .filter_map(|(index, events)| reducer.reduce(events).map(|agg| (*index, agg)))
        .collect();
    // BTreeMap iteration is ascending and duplicate-free.
    SparseSeries::from_ordered(key, entries)
}
