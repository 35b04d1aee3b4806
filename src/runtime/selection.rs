//! Execution-time child selection
//!
//! A picky fan-out defers its pushdown predicates until the executor
//! binds their parameters. Each rescan substitutes the bound values,
//! re-translates the predicates against the same partition metadata, and
//! scans only the children that can still match. Predicates whose
//! parameters have no binding select every child; a superset is always
//! sound.

use std::collections::HashMap;

use serde_json::Value;

use crate::catalog::PartitionMetadata;
use crate::expr::Expr;
use crate::planner::{AccessPath, PathKind, RelationKind, RelationTable};
use crate::ranges::RangeSet;
use crate::translate::translate;

/// Concrete values for join parameters, keyed by relation and column
#[derive(Debug, Clone, Default)]
pub struct ParamBindings {
    values: HashMap<(usize, String), Value>,
}

impl ParamBindings {
    /// No bindings
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Binds one outer column to a value (builder style)
    pub fn with(mut self, rel: usize, column: impl Into<String>, value: Value) -> Self {
        self.values.insert((rel, column.into()), value);
        self
    }

    /// Resolves one parameter, if bound
    pub fn resolve(&self, rel: usize, column: &str) -> Option<Value> {
        self.values.get(&(rel, column.to_string())).cloned()
    }
}

/// Substitutes bindings into a predicate list. Unbound parameters survive.
pub fn bind_quals(quals: &[Expr], bindings: &ParamBindings) -> Vec<Expr> {
    quals
        .iter()
        .map(|qual| qual.bind_params(&|rel, column| bindings.resolve(rel, column)))
        .collect()
}

/// Selects the children of a fan-out path to scan under the given
/// bindings; returns their relation indices in partition order.
///
/// A plain fan-out has nothing to defer and scans every child. A picky
/// fan-out intersects, from the universal set, the range set of each
/// bound pushdown predicate, then keeps the children whose partition
/// index survives.
pub fn select_scan_children(
    relations: &RelationTable,
    path: &AccessPath,
    metadata: &PartitionMetadata,
    bindings: &ParamBindings,
) -> Vec<usize> {
    let (children, pushdown_quals) = match &path.kind {
        PathKind::Fanout { children } => (children, None),
        PathKind::PickyFanout {
            children,
            pushdown_quals,
            ..
        } => (children, Some(pushdown_quals)),
        other => panic!("cannot select children of a {:?} path", other),
    };

    let mut ranges = RangeSet::universal(metadata.child_count());
    if let Some(quals) = pushdown_quals {
        for qual in bind_quals(quals, bindings) {
            ranges = ranges.intersect(&translate(&qual, metadata).range_set);
        }
    }

    children
        .iter()
        .filter(|child| ranges.contains(partition_index(relations, child.rel)))
        .map(|child| child.rel)
        .collect()
}

fn partition_index(relations: &RelationTable, child_rel: usize) -> usize {
    match relations.rel(child_rel).kind {
        RelationKind::ChildMember {
            partition_index, ..
        } => partition_index,
        other => panic!(
            "fan-out child {} is not a child member relation ({:?})",
            child_rel, other
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::{ChildPartition, PartitionRegistry};
    use crate::expr::CmpOp;
    use crate::planner::PlannerContext;
    use crate::rewrite::{BaseRelationRewriter, RelationHook};
    use serde_json::json;

    fn metadata() -> PartitionMetadata {
        PartitionMetadata::range("sales", "key")
            .with_child(ChildPartition::bounded("sales_0", json!(0), json!(10)))
            .with_child(ChildPartition::bounded("sales_1", json!(10), json!(20)))
            .with_child(ChildPartition::bounded("sales_2", json!(20), json!(30)))
            .with_child(ChildPartition::bounded("sales_3", json!(30), json!(40)))
    }

    /// Rewrites a parameterized scan of the four-child table and returns
    /// the picky path it produced
    fn picky_setup() -> (PlannerContext, AccessPath) {
        let registry = PartitionRegistry::new();
        registry.register(metadata()).unwrap();

        let mut ctx = PlannerContext::new();
        let rel = ctx.add_base_relation(
            "sales",
            vec![Expr::compare_param(CmpOp::Eq, 1, "key", 9, "value")],
        );
        BaseRelationRewriter::new(Arc::new(registry)).on_base_relation(&mut ctx, rel);

        let picky = ctx
            .relations
            .rel(rel)
            .paths
            .iter()
            .find(|p| matches!(p.kind, PathKind::PickyFanout { .. }))
            .expect("picky path")
            .clone();
        (ctx, picky)
    }

    #[test]
    fn test_bound_equality_selects_one_child() {
        let (ctx, picky) = picky_setup();
        let bindings = ParamBindings::new().with(9, "value", json!(25));

        let selected = select_scan_children(&ctx.relations, &picky, &metadata(), &bindings);
        assert_eq!(selected.len(), 1);
        assert_eq!(ctx.relations.rte(selected[0]).table, "sales_2");
    }

    #[test]
    fn test_rebinding_moves_the_selection() {
        let (ctx, picky) = picky_setup();
        let meta = metadata();

        for (value, expected) in [(5, "sales_0"), (15, "sales_1"), (39, "sales_3")] {
            let bindings = ParamBindings::new().with(9, "value", json!(value));
            let selected = select_scan_children(&ctx.relations, &picky, &meta, &bindings);
            assert_eq!(selected.len(), 1, "value {}", value);
            assert_eq!(ctx.relations.rte(selected[0]).table, expected);
        }
    }

    #[test]
    fn test_out_of_range_binding_selects_nothing() {
        let (ctx, picky) = picky_setup();
        let bindings = ParamBindings::new().with(9, "value", json!(99));

        let selected = select_scan_children(&ctx.relations, &picky, &metadata(), &bindings);
        assert!(selected.is_empty());
    }

    #[test]
    fn test_unbound_parameter_selects_all_children() {
        let (ctx, picky) = picky_setup();
        let selected =
            select_scan_children(&ctx.relations, &picky, &metadata(), &ParamBindings::new());
        assert_eq!(selected.len(), 4);
    }

    #[test]
    fn test_plain_fanout_scans_everything() {
        let (ctx, picky) = picky_setup();
        let fanout = ctx
            .relations
            .rel(picky.rel)
            .paths
            .iter()
            .find(|p| p.is_fanout())
            .unwrap();
        let bindings = ParamBindings::new().with(9, "value", json!(25));

        let selected = select_scan_children(&ctx.relations, fanout, &metadata(), &bindings);
        assert_eq!(selected.len(), 4);
    }

    #[test]
    fn test_bind_quals_substitutes_only_bound_params() {
        let quals = vec![
            Expr::compare_param(CmpOp::Eq, 1, "key", 9, "value"),
            Expr::compare_param(CmpOp::Lt, 1, "key", 9, "cap"),
        ];
        let bindings = ParamBindings::new().with(9, "value", json!(7));

        let bound = bind_quals(&quals, &bindings);
        assert_eq!(bound[0], Expr::compare(CmpOp::Eq, 1, "key", json!(7)));
        assert!(bound[1].contains_params());
    }
}
