//! Clause-to-range-set translation
//!
//! Walks a filter expression tree bottom-up: comparisons on the partition
//! column resolve to concrete index sets, AND intersects, OR unions, and
//! everything undecidable degrades to the universal set.

use std::cmp::Ordering;

use serde_json::Value;

use crate::catalog::{ChildPartition, PartitionMetadata, PartitionStrategy};
use crate::expr::{compare_values, CmpOp, Expr};
use crate::ranges::RangeSet;

use super::wrapper::ClauseWrapper;

/// Result of translating one clause
#[derive(Debug, Clone)]
pub struct Translation {
    /// Partition indices the clause can possibly match
    pub range_set: RangeSet,
    /// Reusable per-node analysis for child-specific rewriting
    pub wrapper: ClauseWrapper,
}

/// Translates one filter clause against a table's partition metadata.
///
/// Pure function: same clause and metadata always yield the same result.
pub fn translate(expr: &Expr, metadata: &PartitionMetadata) -> Translation {
    let wrapper = walk(expr, metadata);
    Translation {
        range_set: wrapper.range_set().clone(),
        wrapper,
    }
}

fn walk(expr: &Expr, metadata: &PartitionMetadata) -> ClauseWrapper {
    let universal = || RangeSet::universal(metadata.child_count());

    match expr {
        Expr::And(items) => {
            let children: Vec<ClauseWrapper> =
                items.iter().map(|item| walk(item, metadata)).collect();
            let range_set = children
                .iter()
                .fold(universal(), |acc, child| acc.intersect(child.range_set()));
            ClauseWrapper::node(expr.clone(), range_set, children)
        }
        Expr::Or(items) => {
            let children: Vec<ClauseWrapper> =
                items.iter().map(|item| walk(item, metadata)).collect();
            let range_set = children
                .iter()
                .fold(RangeSet::empty(), |acc, child| acc.union(child.range_set()));
            ClauseWrapper::node(expr.clone(), range_set, children)
        }
        Expr::Cmp { op, column, operand } => {
            let range_set = translate_comparison(op, column, operand, metadata)
                .unwrap_or_else(universal);
            ClauseWrapper::leaf(expr.clone(), range_set)
        }
        // Negations and bare leaves cannot prune; a superset is always sound
        Expr::Not(_) | Expr::Column { .. } | Expr::Literal(_) | Expr::Param { .. } => {
            ClauseWrapper::leaf(expr.clone(), universal())
        }
    }
}

/// Resolves one comparison to an index set, or `None` when the comparison
/// does not constrain the partition column with a constant.
fn translate_comparison(
    op: &CmpOp,
    column: &Expr,
    operand: &Expr,
    metadata: &PartitionMetadata,
) -> Option<RangeSet> {
    let column_name = match column {
        Expr::Column { name, .. } => name,
        _ => return None,
    };
    if column_name != &metadata.column {
        return None;
    }
    let value = match operand {
        Expr::Literal(value) => value,
        // Parameters resolve at execution time; nothing to prune here
        _ => return None,
    };

    match metadata.strategy {
        PartitionStrategy::Range => Some(range_children_matching(metadata, *op, value)),
        PartitionStrategy::Hash => match op {
            CmpOp::Eq => Some(RangeSet::single(metadata.hash_child_index(value))),
            _ => None,
        },
    }
}

/// Collects the range children whose `[lower, upper)` interval can hold a
/// value satisfying `key op value`
fn range_children_matching(metadata: &PartitionMetadata, op: CmpOp, value: &Value) -> RangeSet {
    let matching = metadata
        .children
        .iter()
        .enumerate()
        .filter(|(_, child)| range_child_matches(child, op, value))
        .map(|(index, _)| index);
    RangeSet::from_ranges(matching.map(|i| crate::ranges::IndexRange::new(i, i)))
}

fn range_child_matches(child: &ChildPartition, op: CmpOp, value: &Value) -> bool {
    // Bound comparisons are strict: a value not comparable with a bound
    // cannot lie inside it
    let above_lower = |inclusive: bool| match &child.lower {
        None => true,
        Some(lower) => match compare_values(lower, value) {
            Some(Ordering::Less) => true,
            Some(Ordering::Equal) => inclusive,
            _ => false,
        },
    };
    let below_upper = || match &child.upper {
        None => true,
        Some(upper) => matches!(compare_values(value, upper), Some(Ordering::Less)),
    };

    match op {
        // key = v: v inside [lower, upper)
        CmpOp::Eq => above_lower(true) && below_upper(),
        // key < v: the child holds some x < v, i.e. lower < v
        CmpOp::Lt => match &child.lower {
            None => true,
            Some(lower) => matches!(compare_values(lower, value), Some(Ordering::Less)),
        },
        // key <= v: lower <= v
        CmpOp::Lte => above_lower(true),
        // key > v or key >= v: the child holds some x at or above v,
        // i.e. v < upper
        CmpOp::Gt | CmpOp::Gte => below_upper(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ChildPartition;
    use serde_json::json;

    fn metadata() -> PartitionMetadata {
        PartitionMetadata::range("sales", "key")
            .with_child(ChildPartition::bounded("sales_0", json!(0), json!(10)))
            .with_child(ChildPartition::bounded("sales_1", json!(10), json!(20)))
            .with_child(ChildPartition::bounded("sales_2", json!(20), json!(30)))
            .with_child(ChildPartition::bounded("sales_3", json!(30), json!(40)))
    }

    fn indices(expr: &Expr) -> Vec<usize> {
        translate(expr, &metadata()).range_set.indices().collect()
    }

    /// Ground truth: enumerate integer keys per child and test the clause
    /// directly against each key
    fn brute_force(expr: &Expr) -> Vec<usize> {
        use crate::expr::RowFilter;

        let meta = metadata();
        let mut eligible = Vec::new();
        for (i, child) in meta.children.iter().enumerate() {
            let lo = child.lower.as_ref().unwrap().as_i64().unwrap();
            let hi = child.upper.as_ref().unwrap().as_i64().unwrap();
            let any = (lo..hi).any(|key| {
                let row = json!({ "key": key });
                RowFilter::eval(&row, expr)
            });
            if any {
                eligible.push(i);
            }
        }
        eligible
    }

    #[test]
    fn test_conjunctive_range_clause() {
        let expr = Expr::and_all(vec![
            Expr::compare(CmpOp::Gte, 1, "key", json!(15)),
            Expr::compare(CmpOp::Lt, 1, "key", json!(25)),
        ]);
        assert_eq!(indices(&expr), vec![1, 2]);
        assert_eq!(indices(&expr), brute_force(&expr));
    }

    #[test]
    fn test_disjunction_spanning_edges() {
        let expr = Expr::or_all(vec![
            Expr::compare(CmpOp::Lt, 1, "key", json!(5)),
            Expr::compare(CmpOp::Gte, 1, "key", json!(35)),
        ]);
        assert_eq!(indices(&expr), vec![0, 3]);
        assert_eq!(indices(&expr), brute_force(&expr));
    }

    #[test]
    fn test_equality_at_bounds() {
        // Lower bound of a child belongs to it
        let at_lo = Expr::compare(CmpOp::Eq, 1, "key", json!(10));
        assert_eq!(indices(&at_lo), vec![1]);

        // Upper bound is exclusive; it belongs to the next child
        let at_hi = Expr::compare(CmpOp::Eq, 1, "key", json!(20));
        assert_eq!(indices(&at_hi), vec![2]);

        // Outside every child
        let outside = Expr::compare(CmpOp::Eq, 1, "key", json!(40));
        assert!(indices(&outside).is_empty());
    }

    #[test]
    fn test_open_ranges() {
        let below = Expr::compare(CmpOp::Lt, 1, "key", json!(10));
        assert_eq!(indices(&below), vec![0]);
        assert_eq!(indices(&below), brute_force(&below));

        let above = Expr::compare(CmpOp::Gte, 1, "key", json!(30));
        assert_eq!(indices(&above), vec![3]);
        assert_eq!(indices(&above), brute_force(&above));
    }

    #[test]
    fn test_contradiction_is_empty() {
        let expr = Expr::and_all(vec![
            Expr::compare(CmpOp::Lt, 1, "key", json!(0)),
            Expr::compare(CmpOp::Gte, 1, "key", json!(40)),
        ]);
        assert!(indices(&expr).is_empty());
    }

    #[test]
    fn test_parameterized_clause_cannot_prune() {
        let expr = Expr::compare_param(CmpOp::Eq, 1, "key", 2, "value");
        assert_eq!(indices(&expr), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_foreign_column_cannot_prune() {
        let expr = Expr::compare(CmpOp::Eq, 1, "region", json!("emea"));
        assert_eq!(indices(&expr), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_negation_is_conservative() {
        let expr = Expr::negate(Expr::compare(CmpOp::Eq, 1, "key", json!(5)));
        assert_eq!(indices(&expr), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_hash_equality_routes_single_child() {
        let meta = PartitionMetadata::hash("events", "id")
            .with_child(ChildPartition::hashed("events_0"))
            .with_child(ChildPartition::hashed("events_1"))
            .with_child(ChildPartition::hashed("events_2"));

        let expr = Expr::compare(CmpOp::Eq, 1, "id", json!("abc"));
        let set = translate(&expr, &meta).range_set;
        assert_eq!(set.count(), 1);
        assert_eq!(
            set.indices().next().unwrap(),
            meta.hash_child_index(&json!("abc"))
        );

        // Range operators cannot prune a hash table
        let range = Expr::compare(CmpOp::Lt, 1, "id", json!("abc"));
        assert_eq!(translate(&range, &meta).range_set.count(), 3);
    }

    #[test]
    fn test_incomparable_value_matches_nothing() {
        let expr = Expr::compare(CmpOp::Eq, 1, "key", json!("not-a-number"));
        assert!(indices(&expr).is_empty());
    }

    #[test]
    fn test_brute_force_boundary_sweep() {
        for v in [-1_i64, 0, 5, 9, 10, 15, 19, 20, 29, 30, 39, 40, 50] {
            for op in [CmpOp::Eq, CmpOp::Lt, CmpOp::Lte, CmpOp::Gt, CmpOp::Gte] {
                let expr = Expr::compare(op, 1, "key", json!(v));
                let translated = indices(&expr);
                let truth = brute_force(&expr);
                // The translation must be a superset of the truth, and for
                // integer boundaries it is exact except Gt at upper-1,
                // where the dense-domain reading keeps the child
                for i in &truth {
                    assert!(translated.contains(i), "op {:?} v {} lost child {}", op, v, i);
                }
            }
        }
    }
}
