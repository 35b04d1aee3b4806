//! Join plan rewriting
//!
//! Runs once per candidate join pair, after the base rewrite expanded any
//! partitioned inner side. When the inner relation is such a table, every
//! fan-out path on it yields one extra nested-loop candidate whose inner
//! side is a picky fan-out parameterized by the outer relation: outer-row
//! values then prune inner partitions at execution time.

use std::sync::Arc;

use crate::catalog::PartitionLookup;
use crate::expr::Expr;
use crate::observability::{Event, Logger};
use crate::planner::{
    initial_nestloop_cost, join_ordering, nestloop_required_outer, nestloop_rows, AccessPath,
    JoinKind, PathKind, PlannerContext, RelationKind,
};

use super::picky::create_picky_path;
use super::JoinHook;

/// One restriction clause attached to a join
#[derive(Debug, Clone)]
pub struct JoinRestriction {
    /// The clause itself
    pub clause: Expr,
    /// True when the clause was pushed down from above an outer join and
    /// is not valid against null-extended rows
    pub pushed_down: bool,
}

impl JoinRestriction {
    /// A clause that genuinely joins the two sides
    pub fn join_level(clause: Expr) -> Self {
        Self {
            clause,
            pushed_down: false,
        }
    }

    /// A clause pushed down from an enclosing query level
    pub fn pushed_down(clause: Expr) -> Self {
        Self {
            clause,
            pushed_down: true,
        }
    }
}

/// Join-specific data handed to the hook
#[derive(Debug, Clone)]
pub struct JoinExtraData {
    /// The join's restriction clauses
    pub restrictions: Vec<JoinRestriction>,
    /// Join kind recorded in the semi-join info; decides the
    /// null-extension-safe clause split
    pub sj_kind: JoinKind,
}

impl JoinExtraData {
    /// Extra data for a join with the given restriction clauses
    pub fn new(sj_kind: JoinKind, restrictions: Vec<JoinRestriction>) -> Self {
        Self {
            restrictions,
            sj_kind,
        }
    }

    /// Clauses usable to separate partitions.
    ///
    /// Outer joins may only use clauses that hold under null extension;
    /// inner joins may use everything.
    fn partitioning_clauses(&self) -> Vec<Expr> {
        if self.sj_kind.is_outer() {
            self.restrictions
                .iter()
                .filter(|r| !r.pushed_down)
                .map(|r| r.clause.clone())
                .collect()
        } else {
            self.restrictions.iter().map(|r| r.clause.clone()).collect()
        }
    }
}

/// Adds parameter-driven nested-loop candidates over partitioned inners
pub struct JoinRewriter {
    lookup: Arc<dyn PartitionLookup>,
    next: Option<Box<dyn JoinHook>>,
}

impl JoinRewriter {
    /// Creates a rewriter with no downstream hook
    pub fn new(lookup: Arc<dyn PartitionLookup>) -> Self {
        Self { lookup, next: None }
    }

    /// Creates a rewriter chained in front of `next`
    pub fn with_next(lookup: Arc<dyn PartitionLookup>, next: Box<dyn JoinHook>) -> Self {
        Self {
            lookup,
            next: Some(next),
        }
    }
}

impl JoinHook for JoinRewriter {
    fn on_join(
        &self,
        ctx: &mut PlannerContext,
        join_rel: usize,
        outer_rel: usize,
        inner_rel: usize,
        join_kind: JoinKind,
        extra: &JoinExtraData,
    ) {
        // Downstream hooks always run first
        if let Some(next) = &self.next {
            next.on_join(ctx, join_rel, outer_rel, inner_rel, join_kind, extra);
        }

        // Uniqueness enforcement is irrelevant to partition separation
        let join_kind = match join_kind {
            JoinKind::UniqueOuter | JoinKind::UniqueInner => JoinKind::Inner,
            other => other,
        };

        if join_kind == JoinKind::Full || !ctx.pruning_enabled {
            return;
        }

        // The inner side must be a partitioned base relation whose base
        // rewrite already expanded it
        let inner = match ctx.relations.get_rel(inner_rel) {
            Some(rel) => rel,
            None => return,
        };
        if inner.kind != RelationKind::Base {
            return;
        }
        let inner_rte = match ctx.relations.get_rte(inner_rel) {
            Some(rte) => rte,
            None => return,
        };
        if !inner_rte.expand || self.lookup.lookup(&inner_rte.table).is_none() {
            return;
        }

        let join_clauses = extra.partitioning_clauses();

        let outer_path = match ctx.relations.rel(outer_rel).cheapest_total_path() {
            Some(path) => path.clone(),
            None => return,
        };

        let fanouts: Vec<AccessPath> = ctx
            .relations
            .rel(inner_rel)
            .paths
            .iter()
            .filter(|path| path.is_fanout())
            .cloned()
            .collect();
        let restrictions: Vec<Expr> = extra
            .restrictions
            .iter()
            .map(|r| r.clause.clone())
            .collect();

        let mut added = 0usize;
        for fanout in fanouts {
            let mut inner_required = fanout.required_outer.clone();
            inner_required.insert(outer_rel);
            let param_info = ctx
                .relations
                .rel_mut(inner_rel)
                .param_info(&inner_required);

            let inner_path =
                match create_picky_path(&fanout, param_info, join_clauses.clone()) {
                    Some(path) => path,
                    None => continue,
                };

            let cost = initial_nestloop_cost(&outer_path, &inner_path);
            let rows = nestloop_rows(&outer_path, &inner_path);
            let ordering = join_ordering(&outer_path);
            let required_outer = nestloop_required_outer(&outer_path, &inner_path);

            ctx.relations.rel_mut(join_rel).add_path(AccessPath {
                rel: join_rel,
                kind: PathKind::NestLoop {
                    outer: Box::new(outer_path.clone()),
                    inner: Box::new(inner_path),
                    join_kind,
                    restrictions: restrictions.clone(),
                },
                rows,
                cost,
                ordering,
                required_outer,
            });
            added += 1;
        }

        if added > 0 {
            Logger::trace(
                Event::JoinRewrite.as_str(),
                &[
                    ("candidates", &added.to_string()),
                    ("inner", &ctx.relations.rte(inner_rel).table.clone()),
                    ("outer", &ctx.relations.rte(outer_rel).table.clone()),
                ],
            );
        }
    }
}
