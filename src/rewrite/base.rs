//! Base-relation plan rewriting
//!
//! Runs once per base table during path generation. For a partitioned
//! table it derives the surviving partition set from the base filters,
//! expands the relation into exactly those children, regenerates the
//! access-path list, and offers picky variants for join-time pruning.
//!
//! Every guard failure is ineligibility, not an error: the rewriter adds
//! nothing, touches nothing, and still hands control to the next hook.

use std::sync::Arc;

use crate::catalog::{PartitionLookup, PartitionMetadata, PartitionStrategy};
use crate::observability::{Event, Logger};
use crate::planner::{
    build_fanout_paths, materialize_child, PlannerContext, QueryKind, RelationKind, SortOrdering,
};
use crate::ranges::RangeSet;
use crate::translate::translate;

use super::picky::upgrade_fanout_paths;
use super::RelationHook;

/// Rewrites base relations of partitioned tables
pub struct BaseRelationRewriter {
    lookup: Arc<dyn PartitionLookup>,
    next: Option<Box<dyn RelationHook>>,
}

impl BaseRelationRewriter {
    /// Creates a rewriter with no downstream hook
    pub fn new(lookup: Arc<dyn PartitionLookup>) -> Self {
        Self { lookup, next: None }
    }

    /// Creates a rewriter chained in front of `next`
    pub fn with_next(lookup: Arc<dyn PartitionLookup>, next: Box<dyn RelationHook>) -> Self {
        Self {
            lookup,
            next: Some(next),
        }
    }

    fn delegate(&self, ctx: &mut PlannerContext, rel_index: usize) {
        if let Some(next) = &self.next {
            next.on_base_relation(ctx, rel_index);
        }
    }

    /// Checks every precondition and resolves the partition metadata.
    /// `None` means the relation is not ours to rewrite.
    fn eligible(&self, ctx: &PlannerContext, rel_index: usize) -> Option<PartitionMetadata> {
        if !ctx.pruning_enabled {
            return None;
        }
        if ctx.query_kind != QueryKind::Select || !ctx.expansion_suppressed {
            return None;
        }

        let rel = ctx.relations.get_rel(rel_index)?;
        if rel.kind != RelationKind::Base {
            return None;
        }
        let rte = ctx.relations.get_rte(rel_index)?;
        // Already expanded through the default mechanism
        if rte.expand {
            return None;
        }

        self.lookup.lookup(&rte.table)
    }

    fn rewrite(&self, ctx: &mut PlannerContext, rel_index: usize) {
        let meta = match self.eligible(ctx, rel_index) {
            Some(meta) => meta,
            None => {
                self.delegate(ctx, rel_index);
                return;
            }
        };

        // Range children are materialized in key order, so fan-out paths
        // can claim these orderings without a sort
        let orderings: Vec<SortOrdering> = match meta.strategy {
            PartitionStrategy::Range => vec![
                SortOrdering::asc(&meta.column),
                SortOrdering::desc(&meta.column),
            ],
            PartitionStrategy::Hash => Vec::new(),
        };

        // Expansion is ours from here on
        ctx.relations.rte_mut(rel_index).expand = true;

        let mut range_set = RangeSet::universal(meta.child_count());
        let mut wrappers = Vec::new();
        let filters = ctx.relations.rel(rel_index).base_filters.clone();
        for clause in &filters {
            // An empty set cannot widen again; later clauses go untranslated
            if range_set.is_empty() {
                break;
            }
            let translation = translate(clause, &meta);
            range_set = range_set.intersect(&translation.range_set);
            wrappers.push(translation.wrapper);
        }

        // Exactly one slot per surviving partition
        ctx.relations.grow(range_set.count());

        let mut first_child = None;
        for partition_index in range_set.indices() {
            let child = match meta.children.get(partition_index) {
                Some(child) => child,
                None => panic!(
                    "partition index {} outside the child list of '{}'",
                    partition_index, meta.table
                ),
            };
            let slot = materialize_child(ctx, rel_index, partition_index, child, &wrappers);
            if first_child.is_none() {
                first_child = Some(slot);
            }
        }

        {
            let rel = ctx.relations.rel_mut(rel_index);
            rel.first_child = first_child;
            // Paths generated before expansion assumed the unexpanded shape
            rel.paths.clear();
        }
        build_fanout_paths(ctx, rel_index, &orderings);
        upgrade_fanout_paths(ctx, rel_index);

        Logger::trace(
            Event::PartitionPrune.as_str(),
            &[
                ("children", &meta.child_count().to_string()),
                ("surviving", &range_set.count().to_string()),
                ("table", &meta.table),
            ],
        );

        self.delegate(ctx, rel_index);
    }
}

impl RelationHook for BaseRelationRewriter {
    fn on_base_relation(&self, ctx: &mut PlannerContext, rel_index: usize) {
        self.rewrite(ctx, rel_index);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::catalog::{ChildPartition, PartitionRegistry};
    use crate::expr::{CmpOp, Expr};
    use serde_json::json;

    fn registry() -> Arc<PartitionRegistry> {
        let registry = PartitionRegistry::new();
        registry
            .register(
                crate::catalog::PartitionMetadata::range("sales", "key")
                    .with_child(ChildPartition::bounded("sales_0", json!(0), json!(10)))
                    .with_child(ChildPartition::bounded("sales_1", json!(10), json!(20)))
                    .with_child(ChildPartition::bounded("sales_2", json!(20), json!(30)))
                    .with_child(ChildPartition::bounded("sales_3", json!(30), json!(40))),
            )
            .unwrap();
        Arc::new(registry)
    }

    #[test]
    fn test_unregistered_table_untouched() {
        let rewriter = BaseRelationRewriter::new(registry());
        let mut ctx = PlannerContext::new();
        let rel = ctx.add_base_relation("orders", Vec::new());

        rewriter.on_base_relation(&mut ctx, rel);

        assert!(!ctx.relations.rte(rel).expand);
        assert!(ctx.relations.rel(rel).paths.is_empty());
        assert_eq!(ctx.relations.len(), 2);
    }

    #[test]
    fn test_disabled_feature_untouched() {
        let rewriter = BaseRelationRewriter::new(registry());
        let mut ctx = PlannerContext::new();
        ctx.pruning_enabled = false;
        let rel = ctx.add_base_relation("sales", Vec::new());

        rewriter.on_base_relation(&mut ctx, rel);
        assert_eq!(ctx.relations.len(), 2);
    }

    #[test]
    fn test_modify_query_untouched() {
        let rewriter = BaseRelationRewriter::new(registry());
        let mut ctx = PlannerContext::new();
        ctx.query_kind = QueryKind::Modify;
        let rel = ctx.add_base_relation("sales", Vec::new());

        rewriter.on_base_relation(&mut ctx, rel);
        assert_eq!(ctx.relations.len(), 2);
    }

    #[test]
    fn test_expands_all_children_without_filters() {
        let rewriter = BaseRelationRewriter::new(registry());
        let mut ctx = PlannerContext::new();
        let rel = ctx.add_base_relation("sales", Vec::new());

        rewriter.on_base_relation(&mut ctx, rel);

        assert!(ctx.relations.rte(rel).expand);
        assert_eq!(ctx.relations.children_of(rel).len(), 4);
        assert_eq!(ctx.relations.rel(rel).first_child, Some(2));
        // Plain fan-out plus ascending and descending ordered variants
        assert_eq!(ctx.relations.rel(rel).paths.len(), 3);
    }

    #[test]
    fn test_range_filter_prunes_children() {
        let rewriter = BaseRelationRewriter::new(registry());
        let mut ctx = PlannerContext::new();
        let rel = ctx.add_base_relation(
            "sales",
            vec![
                Expr::compare(CmpOp::Gte, 1, "key", json!(15)),
                Expr::compare(CmpOp::Lt, 1, "key", json!(25)),
            ],
        );

        rewriter.on_base_relation(&mut ctx, rel);

        let children = ctx.relations.children_of(rel);
        assert_eq!(children.len(), 2);
        let names: Vec<&str> = children
            .iter()
            .map(|&c| ctx.relations.rte(c).table.as_str())
            .collect();
        assert_eq!(names, vec!["sales_1", "sales_2"]);
    }

    #[test]
    fn test_contradictory_filters_leave_zero_children() {
        let rewriter = BaseRelationRewriter::new(registry());
        let mut ctx = PlannerContext::new();
        let rel = ctx.add_base_relation(
            "sales",
            vec![
                Expr::compare(CmpOp::Lt, 1, "key", json!(0)),
                Expr::compare(CmpOp::Gte, 1, "key", json!(40)),
            ],
        );

        rewriter.on_base_relation(&mut ctx, rel);

        assert!(ctx.relations.children_of(rel).is_empty());
        // Still a valid candidate pool: the zero-child fan-outs
        assert!(!ctx.relations.rel(rel).paths.is_empty());
        assert_eq!(ctx.relations.rel(rel).rows, 0.0);
    }

    #[test]
    fn test_next_hook_runs_even_when_ineligible() {
        struct Counter(Arc<AtomicUsize>);
        impl RelationHook for Counter {
            fn on_base_relation(&self, _: &mut PlannerContext, _: usize) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let calls = Arc::new(AtomicUsize::new(0));
        let rewriter =
            BaseRelationRewriter::with_next(registry(), Box::new(Counter(Arc::clone(&calls))));
        let mut ctx = PlannerContext::new();
        let partitioned = ctx.add_base_relation("sales", Vec::new());
        let plain = ctx.add_base_relation("orders", Vec::new());

        rewriter.on_base_relation(&mut ctx, partitioned);
        rewriter.on_base_relation(&mut ctx, plain);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
