//! prunedb - a partition-pruning and join-aware plan-rewriting core
//!
//! Given a table declared as partitioned, the base-relation rewriter
//! derives the minimal set of child partitions a query's filters can
//! match and expands the plan over exactly those children. The join
//! rewriter then adds nested-loop candidates whose inner side defers
//! join predicates to execution time, pruning partitions with outer-row
//! values the planner never sees.

pub mod catalog;
pub mod cli;
pub mod expr;
pub mod observability;
pub mod planner;
pub mod ranges;
pub mod rewrite;
pub mod runtime;
pub mod translate;
