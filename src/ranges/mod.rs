//! Range-set algebra for prunedb
//!
//! A `RangeSet` describes which partition indices of a partitioned table
//! are still eligible for a query, as a minimal sorted list of disjoint
//! closed intervals.
//!
//! # Invariants
//!
//! - Intervals are sorted ascending and never overlap or touch
//! - The empty set means "no partition can match"
//! - `[0, child_count - 1]` means "every partition may match"
//! - `intersect` and `union` always return maximally merged sets

mod range_set;

pub use range_set::{IndexRange, RangeSet};
