//! Merged interval lists over the partition index space
//!
//! Every operation preserves the sorted/disjoint/maximally-merged form,
//! so callers can rely on interval order without re-normalizing.

use std::fmt;

/// A closed interval `[lo, hi]` of partition indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    lo: usize,
    hi: usize,
}

impl IndexRange {
    /// Creates a closed interval. `lo` must not exceed `hi`.
    pub fn new(lo: usize, hi: usize) -> Self {
        assert!(lo <= hi, "interval lower bound {} exceeds upper bound {}", lo, hi);
        Self { lo, hi }
    }

    /// Lower bound (inclusive)
    pub fn lower(&self) -> usize {
        self.lo
    }

    /// Upper bound (inclusive)
    pub fn upper(&self) -> usize {
        self.hi
    }

    /// Number of indices covered
    pub fn len(&self) -> usize {
        self.hi - self.lo + 1
    }

    /// Returns true if the interval covers `index`
    pub fn contains(&self, index: usize) -> bool {
        self.lo <= index && index <= self.hi
    }

    /// Intersection of two intervals, if non-empty
    fn intersect(&self, other: &IndexRange) -> Option<IndexRange> {
        let lo = self.lo.max(other.lo);
        let hi = self.hi.min(other.hi);
        if lo <= hi {
            Some(IndexRange { lo, hi })
        } else {
            None
        }
    }

    /// Whether two intervals overlap or sit directly next to each other,
    /// meaning they collapse into one interval under union
    fn mergeable(&self, other: &IndexRange) -> bool {
        // Adjacent counts: [0,2] and [3,5] merge to [0,5]
        self.lo <= other.hi.saturating_add(1) && other.lo <= self.hi.saturating_add(1)
    }
}

impl fmt::Display for IndexRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lo == self.hi {
            write!(f, "{}", self.lo)
        } else {
            write!(f, "{}-{}", self.lo, self.hi)
        }
    }
}

/// A set of partition indices kept as sorted, disjoint, maximally merged
/// closed intervals
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RangeSet {
    ranges: Vec<IndexRange>,
}

impl RangeSet {
    /// The empty set: no partition can match
    pub fn empty() -> Self {
        Self { ranges: Vec::new() }
    }

    /// The universal set over `child_count` partitions.
    /// Zero partitions yield the empty set.
    pub fn universal(child_count: usize) -> Self {
        if child_count == 0 {
            return Self::empty();
        }
        Self {
            ranges: vec![IndexRange::new(0, child_count - 1)],
        }
    }

    /// A set holding exactly one index
    pub fn single(index: usize) -> Self {
        Self {
            ranges: vec![IndexRange::new(index, index)],
        }
    }

    /// Builds a set from arbitrary intervals, normalizing to merged form
    pub fn from_ranges(ranges: impl IntoIterator<Item = IndexRange>) -> Self {
        let mut sorted: Vec<IndexRange> = ranges.into_iter().collect();
        sorted.sort_by_key(|r| r.lo);

        let mut merged: Vec<IndexRange> = Vec::with_capacity(sorted.len());
        for range in sorted {
            match merged.last_mut() {
                Some(last) if last.mergeable(&range) => {
                    last.hi = last.hi.max(range.hi);
                }
                _ => merged.push(range),
            }
        }
        Self { ranges: merged }
    }

    /// Returns true if no index is covered
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Total number of covered indices
    pub fn count(&self) -> usize {
        self.ranges.iter().map(IndexRange::len).sum()
    }

    /// Returns true if `index` is covered
    pub fn contains(&self, index: usize) -> bool {
        // Intervals are sorted, so a binary search on lower bounds works
        match self.ranges.binary_search_by(|r| r.lo.cmp(&index)) {
            Ok(_) => true,
            Err(0) => false,
            Err(pos) => self.ranges[pos - 1].contains(index),
        }
    }

    /// The underlying intervals, sorted ascending
    pub fn ranges(&self) -> &[IndexRange] {
        &self.ranges
    }

    /// Lazy ascending iteration over every covered index
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.ranges.iter().flat_map(|r| r.lo..=r.hi)
    }

    /// Set intersection; both inputs stay untouched
    pub fn intersect(&self, other: &RangeSet) -> RangeSet {
        let mut result = Vec::new();
        let (mut i, mut j) = (0, 0);

        while i < self.ranges.len() && j < other.ranges.len() {
            let a = &self.ranges[i];
            let b = &other.ranges[j];

            if let Some(overlap) = a.intersect(b) {
                result.push(overlap);
            }

            // Advance whichever interval ends first
            if a.hi <= b.hi {
                i += 1;
            } else {
                j += 1;
            }
        }

        // Pairwise overlaps of merged inputs are already disjoint and sorted,
        // but two results may touch; normalize to keep the merged invariant.
        RangeSet::from_ranges(result)
    }

    /// Set union; both inputs stay untouched
    pub fn union(&self, other: &RangeSet) -> RangeSet {
        RangeSet::from_ranges(
            self.ranges
                .iter()
                .chain(other.ranges.iter())
                .copied()
                .collect::<Vec<_>>(),
        )
    }
}

impl fmt::Display for RangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, range) in self.ranges.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", range)?;
        }
        write!(f, "}}")
    }
}
