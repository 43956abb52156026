use serde::Serialize;

use crate::trend::TrendError;

/// Per-bucket aggregates of one series, with gaps.
///
/// Entries are strictly ascending by bucket index with no duplicates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SparseSeries<T> {
    pub key: String,
    entries: Vec<(usize, T)>,
}

impl<T> SparseSeries<T> {
    /// Validates ordering; out-of-order or repeated indices are rejected.
    pub fn new(key: impl Into<String>, entries: Vec<(usize, T)>) -> Result<Self, TrendError> {
        let key = key.into();
        for pair in entries.windows(2) {
            let (prev, next) = (pair[0].0, pair[1].0);
            if next <= prev {
                return Err(TrendError::invariant(
                    &key,
                    format!("bucket index {next} follows {prev}"),
                ));
            }
        }
        Ok(Self { key, entries })
    }

    pub(crate) fn from_ordered(key: &str, entries: Vec<(usize, T)>) -> Self {
        Self {
            key: key.to_string(),
            entries,
        }
    }

    pub fn empty(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[(usize, T)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_bucket(&self, index: usize) -> bool {
        self.entries.binary_search_by_key(&index, |(i, _)| *i).is_ok()
    }

    pub fn into_parts(self) -> (String, Vec<(usize, T)>) {
        (self.key, self.entries)
    }
}

/// Exactly one aggregate per bucket; the position is the bucket index.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DenseSeries<T> {
    pub key: String,
    pub points: Vec<T>,
}

impl<T> DenseSeries<T> {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.points.get(index)
    }

    pub fn map<U, F>(&self, f: F) -> DenseSeries<U>
    where
        F: FnMut(&T) -> U,
    {
        DenseSeries {
            key: self.key.clone(),
            points: self.points.iter().map(f).collect(),
        }
    }

    /// Back to sparse form with every bucket present.
    pub fn to_sparse(&self) -> SparseSeries<T>
    where
        T: Clone,
    {
        SparseSeries::from_ordered(&self.key, self.points.iter().cloned().enumerate().collect())
    }
}

/// One merged aggregate per bucket across several series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rollup<A> {
    pub points: Vec<A>,
}

impl<A> Rollup<A> {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn map<U, F>(&self, f: F) -> Rollup<U>
    where
        F: FnMut(&A) -> U,
    {
        Rollup {
            points: self.points.iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_rejects_unordered_indices() {
        let err = SparseSeries::new("def-1", vec![(2, 1), (1, 1)]).unwrap_err();
        assert!(matches!(err, TrendError::InvariantViolation { ref key, .. } if key == "def-1"));
    }

    #[test]
    fn sparse_rejects_duplicates() {
        assert!(SparseSeries::new("k", vec![(0, 'a'), (3, 'b'), (3, 'c')]).is_err());
    }

    #[test]
    fn sparse_lookup() {
        let s = SparseSeries::new("k", vec![(0, 1), (4, 2)]).unwrap();
        assert!(s.has_bucket(4));
        assert!(!s.has_bucket(2));
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn dense_round_trips_to_sparse() {
        let dense = DenseSeries {
            key: "k".to_string(),
            points: vec![1, 2, 3],
        };
        let sparse = dense.to_sparse();
        assert_eq!(sparse.entries(), &[(0, 1), (1, 2), (2, 3)]);
        assert_eq!(dense.map(|v| v * 10).points, vec![10, 20, 30]);
    }
}
