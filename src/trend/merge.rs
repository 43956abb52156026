//! Multi-series merging.

use std::collections::{BTreeSet, HashSet};
use std::hash::Hash;
use std::ops::Add;

use crate::trend::series::{DenseSeries, Rollup};
use crate::trend::TrendError;

/// Folds the aggregate of every series at each bucket into one value.
///
/// `combine` should be associative and commutative so the result does not
/// depend on the order of `series`. Every series must hold exactly
/// `number_of_buckets` points.
pub fn merge_series<T, A, F>(
    series: &[DenseSeries<T>],
    number_of_buckets: usize,
    zero: A,
    combine: F,
) -> Result<Rollup<A>, TrendError>
where
    A: Clone,
    F: Fn(A, &T) -> A,
{
    if let Some(bad) = series.iter().find(|s| s.len() != number_of_buckets) {
        return Err(TrendError::invariant(
            &bad.key,
            format!(
                "dense series has {} points, expected {number_of_buckets}",
                bad.len()
            ),
        ));
    }

    let points = (0..number_of_buckets)
        .map(|index| {
            series
                .iter()
                .fold(zero.clone(), |acc, s| combine(acc, &s.points[index]))
        })
        .collect();
    Ok(Rollup { points })
}

pub fn sum_rollup<T>(series: &[DenseSeries<T>], number_of_buckets: usize) -> Result<Rollup<T>, TrendError>
where
    T: Copy + Default + Add<Output = T>,
{
    merge_series(series, number_of_buckets, T::default(), |acc, v| acc + *v)
}

pub fn union_rollup<V>(
    series: &[DenseSeries<BTreeSet<V>>],
    number_of_buckets: usize,
) -> Result<Rollup<BTreeSet<V>>, TrendError>
where
    V: Ord + Clone,
{
    merge_series(series, number_of_buckets, BTreeSet::new(), |mut acc, set| {
        acc.extend(set.iter().cloned());
        acc
    })
}

/// Number of distinct members per bucket across all series.
pub fn union_cardinality<V>(
    series: &[DenseSeries<BTreeSet<V>>],
    number_of_buckets: usize,
) -> Result<Rollup<usize>, TrendError>
where
    V: Ord + Clone,
{
    Ok(union_rollup(series, number_of_buckets)?.map(BTreeSet::len))
}

/// Running work-in-progress count.
///
/// Scans buckets in ascending order over one carried set: each bucket adds
/// its `entering` ids, then removes its `leaving` ids, and reports the set
/// size afterwards. Both inputs must cover the same buckets.
pub fn running_wip<'a, V, I, J>(entering: I, leaving: J) -> Result<Vec<usize>, TrendError>
where
    V: Eq + Hash + Clone + 'a,
    I: IntoIterator,
    I::IntoIter: ExactSizeIterator,
    I::Item: IntoIterator<Item = &'a V>,
    J: IntoIterator,
    J::IntoIter: ExactSizeIterator,
    J::Item: IntoIterator<Item = &'a V>,
{
    let entering = entering.into_iter();
    let leaving = leaving.into_iter();
    if entering.len() != leaving.len() {
        return Err(TrendError::invariant(
            "wip",
            format!(
                "{} entering buckets but {} leaving buckets",
                entering.len(),
                leaving.len()
            ),
        ));
    }

    let mut open: HashSet<V> = HashSet::new();
    let mut counts = Vec::with_capacity(entering.len());
    for (added, removed) in entering.zip(leaving) {
        open.extend(added.into_iter().cloned());
        for id in removed {
            open.remove(id);
        }
        counts.push(open.len());
    }
    Ok(counts)
}
