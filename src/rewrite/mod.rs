//! Plan rewriting for prunedb
//!
//! Two hooks plug into path generation. The base-relation rewriter runs
//! once per table and replaces a partitioned table's default plan shape
//! with a pruned fan-out over the surviving children. The join rewriter
//! runs once per candidate join pair and adds nested-loop candidates
//! whose inner side prunes partitions with outer-row values at execution
//! time.
//!
//! Both rewriters are additive and decline rather than fail: every guard
//! failure leaves the plan state untouched and still invokes the next
//! hook in the chain. Chaining is plain dependency injection; a rewriter
//! owns an optional boxed next handler.

pub mod base;
pub mod join;
pub mod picky;

use crate::planner::{JoinKind, PlannerContext};

pub use base::BaseRelationRewriter;
pub use join::{JoinExtraData, JoinRestriction, JoinRewriter};
pub use picky::{create_picky_path, upgrade_fanout_paths};

/// Hook invoked once per base relation during path generation
pub trait RelationHook {
    /// Rewrites (or declines to rewrite) one base relation
    fn on_base_relation(&self, ctx: &mut PlannerContext, rel_index: usize);
}

/// Hook invoked once per candidate join pair
pub trait JoinHook {
    /// Adds (or declines to add) join candidates for one pair
    #[allow(clippy::too_many_arguments)]
    fn on_join(
        &self,
        ctx: &mut PlannerContext,
        join_rel: usize,
        outer_rel: usize,
        inner_rel: usize,
        join_kind: JoinKind,
        extra: &JoinExtraData,
    );
}
