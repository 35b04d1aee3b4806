//! Access-path candidates
//!
//! A path is one candidate execution strategy for a relation. Paths are
//! immutable once registered into a relation's candidate pool; cost
//! comparison never mutates them. The kind is a tagged variant so callers
//! pattern-match instead of probing runtime types.

use std::collections::BTreeSet;

use crate::expr::Expr;

/// Estimated execution cost
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cost {
    /// Cost before the first row can be returned
    pub startup: f64,
    /// Cost to return every row
    pub total: f64,
}

impl Cost {
    /// Zero cost
    pub fn zero() -> Self {
        Self {
            startup: 0.0,
            total: 0.0,
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// An ordering a path can claim over its output rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrdering {
    /// Column the rows are ordered by
    pub column: String,
    /// Direction of the ordering
    pub direction: SortDirection,
}

impl SortOrdering {
    /// Ascending ordering on a column
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Descending ordering on a column
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Join kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    /// Inner join with the outer side made unique first
    UniqueOuter,
    /// Inner join with the inner side made unique first
    UniqueInner,
}

impl JoinKind {
    /// True for join kinds that null-extend one side
    pub fn is_outer(&self) -> bool {
        matches!(self, JoinKind::Left | JoinKind::Right | JoinKind::Full)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JoinKind::Inner => "inner",
            JoinKind::Left => "left",
            JoinKind::Right => "right",
            JoinKind::Full => "full",
            JoinKind::UniqueOuter => "unique-outer",
            JoinKind::UniqueInner => "unique-inner",
        }
    }
}

/// Parameterized-path record: the outer relations a path needs bound
/// before it can run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamPathInfo {
    /// Relation indices whose output parameterizes the path
    pub required_outer: BTreeSet<usize>,
}

/// The strategy a path executes
#[derive(Debug, Clone)]
pub enum PathKind {
    /// Scan one relation front to back
    SeqScan,
    /// Scan every child and append their row streams
    Fanout {
        /// Per-child sub-paths, in partition order
        children: Vec<AccessPath>,
    },
    /// Fan-out that re-evaluates its pushdown predicates once parameters
    /// are bound, scanning only the children that can still match
    PickyFanout {
        /// Per-child sub-paths, in partition order
        children: Vec<AccessPath>,
        /// Predicates deferred to execution time; each references at
        /// least one parameter
        pushdown_quals: Vec<Expr>,
        /// The parameterization this path runs under
        param_info: ParamPathInfo,
    },
    /// Nested-loop join: rescan the inner side once per outer row
    NestLoop {
        outer: Box<AccessPath>,
        inner: Box<AccessPath>,
        join_kind: JoinKind,
        /// Restriction clauses applied at the join
        restrictions: Vec<Expr>,
    },
}

/// One candidate access path
#[derive(Debug, Clone)]
pub struct AccessPath {
    /// Relation this path scans
    pub rel: usize,
    /// Execution strategy
    pub kind: PathKind,
    /// Estimated output rows
    pub rows: f64,
    /// Estimated cost
    pub cost: Cost,
    /// Ordering the path can claim without sorting
    pub ordering: Option<SortOrdering>,
    /// Relations whose output this path depends on
    pub required_outer: BTreeSet<usize>,
}

impl AccessPath {
    /// True for genuine multi-child fan-out paths
    pub fn is_fanout(&self) -> bool {
        matches!(self.kind, PathKind::Fanout { .. })
    }

    /// Kind label for explain output
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            PathKind::SeqScan => "SeqScan",
            PathKind::Fanout { .. } => "Fanout",
            PathKind::PickyFanout { .. } => "PickyFanout",
            PathKind::NestLoop { .. } => "NestLoop",
        }
    }
}
