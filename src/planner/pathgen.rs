//! Generic path construction
//!
//! Builds the candidate paths the rewriters register: sequential scans for
//! plain relations, fan-out paths over materialized children, and the
//! nested-loop support calls the join rewriter composes. The cost model
//! owns every estimate; this module only assembles paths.

use std::collections::BTreeSet;

use crate::catalog::ChildPartition;
use crate::translate::ClauseWrapper;

use super::context::PlannerContext;
use super::cost;
use super::path::{AccessPath, PathKind, SortOrdering};
use super::relation::{RangeTableEntry, RelationDescriptor};

/// Materializes one child relation of an expanded parent.
///
/// The parent's retained wrappers rebuild each filter clause for this
/// specific child, dropping disjunction arms that cannot match its key
/// range, then references move from the parent to the child relation.
/// Returns the child's relation index.
pub fn materialize_child(
    ctx: &mut PlannerContext,
    parent: usize,
    partition_index: usize,
    child: &ChildPartition,
    wrappers: &[ClauseWrapper],
) -> usize {
    let slot = match ctx.relations.first_empty_slot() {
        Some(slot) => slot,
        None => panic!(
            "no empty slot for child {} of relation {}; table was not grown",
            partition_index, parent
        ),
    };

    let filters: Vec<_> = wrappers
        .iter()
        .map(|wrapper| match wrapper.clause_for_child(partition_index) {
            Some(clause) => clause.rewrite_rel(parent, slot),
            None => panic!(
                "clause {} excludes materialized child {} of relation {}",
                wrapper.clause().render(),
                partition_index,
                parent
            ),
        })
        .collect();

    let rows = cost::filtered_rows(filters.len());
    let mut required_outer = BTreeSet::new();
    for filter in &filters {
        filter.collect_param_rels(&mut required_outer);
    }

    let mut rel = RelationDescriptor::new_child(slot, parent, partition_index, filters);
    rel.rows = rows;
    rel.add_path(AccessPath {
        rel: slot,
        kind: PathKind::SeqScan,
        rows,
        cost: cost::seq_scan_cost(rows),
        ordering: None,
        required_outer,
    });

    ctx.relations
        .set(slot, RangeTableEntry::new(child.id.clone()), rel);
    slot
}

/// Generates the access-path list for a plain (unexpanded) base relation
pub fn build_seqscan_pathlist(ctx: &mut PlannerContext, rel_index: usize) {
    let rel = ctx.relations.rel_mut(rel_index);
    let rows = cost::filtered_rows(rel.base_filters.len());
    let mut required_outer = BTreeSet::new();
    for filter in &rel.base_filters {
        filter.collect_param_rels(&mut required_outer);
    }

    rel.rows = rows;
    rel.add_path(AccessPath {
        rel: rel_index,
        kind: PathKind::SeqScan,
        rows,
        cost: cost::seq_scan_cost(rows),
        ordering: None,
        required_outer,
    });
}

/// Generates fan-out paths over a relation's materialized children and
/// refreshes the relation's row estimate.
///
/// One plain fan-out is always added, zero children included. Each given
/// ordering adds a sorted variant claiming it for free: the children are
/// materialized in partition order, so their concatenation is already
/// ordered by the partition column.
pub fn build_fanout_paths(ctx: &mut PlannerContext, rel_index: usize, orderings: &[SortOrdering]) {
    let child_indices = ctx.relations.children_of(rel_index);

    let children: Vec<AccessPath> = child_indices
        .iter()
        .map(|&child| {
            match ctx.relations.rel(child).paths.first() {
                Some(path) => path.clone(),
                None => panic!("child relation {} has no access path", child),
            }
        })
        .collect();

    let rows = cost::fanout_rows(&children);
    let path_cost = cost::fanout_cost(&children);
    let mut required_outer = BTreeSet::new();
    for child in &children {
        required_outer.extend(child.required_outer.iter().copied());
    }

    let rel = ctx.relations.rel_mut(rel_index);
    rel.rows = rows;
    rel.add_path(AccessPath {
        rel: rel_index,
        kind: PathKind::Fanout {
            children: children.clone(),
        },
        rows,
        cost: path_cost,
        ordering: None,
        required_outer: required_outer.clone(),
    });

    for ordering in orderings {
        rel.add_path(AccessPath {
            rel: rel_index,
            kind: PathKind::Fanout {
                children: children.clone(),
            },
            rows,
            cost: path_cost,
            ordering: Some(ordering.clone()),
            required_outer: required_outer.clone(),
        });
    }
}

/// Ordering a join's output inherits: the outer path's ordering
pub fn join_ordering(outer: &AccessPath) -> Option<SortOrdering> {
    outer.ordering.clone()
}

/// Required-outer set for a nested loop over the given pair.
///
/// The join satisfies its own sides internally, so both relation indices
/// drop out of the union.
pub fn nestloop_required_outer(outer: &AccessPath, inner: &AccessPath) -> BTreeSet<usize> {
    let mut required: BTreeSet<usize> = outer
        .required_outer
        .union(&inner.required_outer)
        .copied()
        .collect();
    required.remove(&outer.rel);
    required.remove(&inner.rel);
    required
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ChildPartition, PartitionMetadata};
    use crate::expr::{CmpOp, Expr};
    use crate::translate::translate;
    use serde_json::json;

    fn metadata() -> PartitionMetadata {
        PartitionMetadata::range("sales", "key")
            .with_child(ChildPartition::bounded("sales_0", json!(0), json!(10)))
            .with_child(ChildPartition::bounded("sales_1", json!(10), json!(20)))
    }

    #[test]
    fn test_materialize_child_rewrites_filters() {
        let meta = metadata();
        let clause = Expr::compare(CmpOp::Gte, 1, "key", json!(5));
        let wrapper = translate(&clause, &meta).wrapper;

        let mut ctx = PlannerContext::new();
        let parent = ctx.add_base_relation("sales", vec![clause]);
        ctx.relations.grow(1);

        let child = materialize_child(&mut ctx, parent, 0, &meta.children[0], &[wrapper]);
        let rel = ctx.relations.rel(child);

        assert_eq!(
            rel.base_filters,
            vec![Expr::compare(CmpOp::Gte, child, "key", json!(5))]
        );
        assert_eq!(rel.paths.len(), 1);
        assert_eq!(ctx.relations.rte(child).table, "sales_0");
    }

    #[test]
    fn test_fanout_paths_sum_children_and_claim_orderings() {
        let meta = metadata();
        let mut ctx = PlannerContext::new();
        let parent = ctx.add_base_relation("sales", Vec::new());
        ctx.relations.grow(2);
        materialize_child(&mut ctx, parent, 0, &meta.children[0], &[]);
        materialize_child(&mut ctx, parent, 1, &meta.children[1], &[]);

        let orderings = [SortOrdering::asc("key"), SortOrdering::desc("key")];
        build_fanout_paths(&mut ctx, parent, &orderings);

        let rel = ctx.relations.rel(parent);
        assert_eq!(rel.paths.len(), 3);
        assert_eq!(rel.rows, 2.0 * cost::DEFAULT_CHILD_ROWS);
        assert!(rel.paths[0].ordering.is_none());
        assert_eq!(rel.paths[1].ordering, Some(SortOrdering::asc("key")));
        assert_eq!(rel.paths[2].ordering, Some(SortOrdering::desc("key")));
        // Free orderings: the sorted variants cost the same
        assert_eq!(rel.paths[1].cost, rel.paths[0].cost);
    }

    #[test]
    fn test_zero_child_fanout_is_valid() {
        let mut ctx = PlannerContext::new();
        let parent = ctx.add_base_relation("sales", Vec::new());
        build_fanout_paths(&mut ctx, parent, &[]);

        let rel = ctx.relations.rel(parent);
        assert_eq!(rel.paths.len(), 1);
        assert_eq!(rel.rows, 0.0);
        match &rel.paths[0].kind {
            PathKind::Fanout { children } => assert!(children.is_empty()),
            other => panic!("expected fan-out, got {:?}", other),
        }
    }

    #[test]
    fn test_parameterized_child_filters_flow_into_required_outer() {
        let meta = metadata();
        let clause = Expr::compare_param(CmpOp::Eq, 1, "key", 9, "value");
        let wrapper = translate(&clause, &meta).wrapper;

        let mut ctx = PlannerContext::new();
        let parent = ctx.add_base_relation("sales", vec![clause]);
        ctx.relations.grow(2);
        materialize_child(&mut ctx, parent, 0, &meta.children[0], &[wrapper.clone()]);
        materialize_child(&mut ctx, parent, 1, &meta.children[1], &[wrapper]);
        build_fanout_paths(&mut ctx, parent, &[]);

        let fanout = &ctx.relations.rel(parent).paths[0];
        assert!(fanout.required_outer.contains(&9));
    }

    #[test]
    fn test_nestloop_required_outer_drops_join_sides() {
        let mut outer_req = BTreeSet::new();
        outer_req.insert(7);
        let outer = AccessPath {
            rel: 2,
            kind: PathKind::SeqScan,
            rows: 10.0,
            cost: cost::seq_scan_cost(10.0),
            ordering: Some(SortOrdering::asc("value")),
            required_outer: outer_req,
        };
        let mut inner_req = BTreeSet::new();
        inner_req.insert(2);
        let inner = AccessPath {
            rel: 1,
            kind: PathKind::SeqScan,
            rows: 10.0,
            cost: cost::seq_scan_cost(10.0),
            ordering: None,
            required_outer: inner_req,
        };

        let required = nestloop_required_outer(&outer, &inner);
        assert_eq!(required.into_iter().collect::<Vec<_>>(), vec![7]);
        assert_eq!(join_ordering(&outer), Some(SortOrdering::asc("value")));
    }
}
