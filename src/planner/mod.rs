//! Planner substrate for prunedb
//!
//! Owns the mutable state one planning call works over: the relation
//! table, relation descriptors, the tagged access-path variants, the
//! deterministic cost model, and generic path construction. The rewriters
//! in `rewrite` drive this module; nothing here decides *whether* to
//! prune, only *how* plan state is represented and built.
//!
//! # Design Principles
//!
//! - Deterministic: same relation state always yields the same paths,
//!   estimates, and explain text
//! - Additive: paths are immutable once registered; candidate pools only
//!   grow
//! - Index-stable: growing the relation table never moves an existing
//!   entry

mod context;
mod cost;
mod explain;
mod path;
mod pathgen;
mod relation;

pub use context::{PlannerContext, QueryKind};
pub use cost::{
    fanout_cost, fanout_rows, filtered_rows, initial_nestloop_cost, nestloop_rows,
    picky_fanout_estimate, seq_scan_cost, DEFAULT_CHILD_ROWS, RUNTIME_PRUNE_SELECTIVITY,
};
pub use explain::{PathExplain, RelationExplain};
pub use path::{AccessPath, Cost, JoinKind, ParamPathInfo, PathKind, SortDirection, SortOrdering};
pub use pathgen::{
    build_fanout_paths, build_seqscan_pathlist, join_ordering, materialize_child,
    nestloop_required_outer,
};
pub use relation::{RangeTableEntry, RelationDescriptor, RelationKind, RelationTable};
