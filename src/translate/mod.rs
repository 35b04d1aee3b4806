//! Predicate translation subsystem for prunedb
//!
//! Turns one boolean filter clause into the exact set of partition indices
//! that can possibly hold matching rows, plus a reusable wrapper that
//! remembers the per-node analysis for child-specific clause rewriting.
//!
//! # Contract
//!
//! - `translate` is a pure function of the clause and the metadata
//! - The returned range set is a sound superset: a partition outside it
//!   cannot contain a matching row
//! - Clauses the translator cannot decide (parameters, foreign columns,
//!   negations) degrade to the universal set: they never prune, they
//!   never exclude

mod translator;
mod wrapper;

pub use translator::{translate, Translation};
pub use wrapper::ClauseWrapper;
