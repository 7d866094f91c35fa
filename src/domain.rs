//! Value-domain mapper (discretization).
//!
//! Sparse keys are compressed into the dense position range `1..=len` so the
//! tree depth depends on the number of distinct keys, not on their magnitude.
//! Positions are 1-based and ascend with the key order.

use std::ops::{Bound, RangeBounds};

use crate::error::{Error, Result};

/// Sorted, deduplicated set of keys defining the leaf positions of a tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Domain<K = i64> {
    values: Vec<K>,
}

impl<K: Ord> Domain<K> {
    /// Build the domain from the full batch of keys known up front.
    pub fn new(keys: impl IntoIterator<Item = K>) -> Result<Self> {
        let mut values: Vec<K> = keys.into_iter().collect();
        if values.is_empty() {
            return Err(Error::EmptyDomain);
        }
        values.sort_unstable();
        values.dedup();
        Ok(Self { values })
    }

    pub fn contains(&self, key: &K) -> bool {
        self.values.binary_search(key).is_ok()
    }

    /// Position of `key` in `1..=len`.
    pub fn rank(&self, key: &K) -> Result<usize>
    where
        K: std::fmt::Debug,
    {
        self.values
            .binary_search(key)
            .map(|idx| idx + 1)
            .map_err(|_| Error::domain_lookup(key))
    }

    /// Closed position interval covered by an arbitrary key range.
    ///
    /// The bounds need not be members of the domain. Returns `None` when no
    /// position falls inside the range.
    pub fn position_range<R: RangeBounds<K>>(&self, range: R) -> Option<(usize, usize)> {
        let first = match range.start_bound() {
            Bound::Included(k) => self.values.partition_point(|v| v < k),
            Bound::Excluded(k) => self.values.partition_point(|v| v <= k),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(k) => self.values.partition_point(|v| v <= k),
            Bound::Excluded(k) => self.values.partition_point(|v| v < k),
            Bound::Unbounded => self.values.len(),
        };
        if first >= end {
            None
        } else {
            Some((first + 1, end))
        }
    }
}

impl<K> Domain<K> {
    /// Number of distinct keys, i.e. the highest position.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`: empty domains are rejected on construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Key stored at `position` (1-based).
    #[inline]
    pub fn value(&self, position: usize) -> Option<&K> {
        position.checked_sub(1).and_then(|idx| self.values.get(idx))
    }

    /// Key at a position produced by a tree traversal.
    #[inline]
    pub(crate) fn value_at(&self, position: usize) -> &K {
        &self.values[position - 1]
    }

    /// Keys in ascending order; the i-th item sits at position `i + 1`.
    pub fn iter(&self) -> std::slice::Iter<'_, K> {
        self.values.iter()
    }

    pub(crate) fn memory_usage(&self) -> usize {
        self.values.capacity() * std::mem::size_of::<K>()
    }
}

impl<'a, K> IntoIterator for &'a Domain<K> {
    type Item = &'a K;
    type IntoIter = std::slice::Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
