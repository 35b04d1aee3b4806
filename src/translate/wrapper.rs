//! Per-clause translation wrappers
//!
//! A `ClauseWrapper` mirrors one filter clause's tree shape and records the
//! partition range set each node implies. Child materialization uses it to
//! rebuild a clause for one specific child, dropping OR-arms that cannot
//! match that child's key range.

use crate::expr::Expr;
use crate::ranges::RangeSet;

/// Translation result for one clause node
#[derive(Debug, Clone)]
pub struct ClauseWrapper {
    expr: Expr,
    range_set: RangeSet,
    children: Vec<ClauseWrapper>,
}

impl ClauseWrapper {
    pub(crate) fn leaf(expr: Expr, range_set: RangeSet) -> Self {
        Self {
            expr,
            range_set,
            children: Vec::new(),
        }
    }

    pub(crate) fn node(expr: Expr, range_set: RangeSet, children: Vec<ClauseWrapper>) -> Self {
        Self {
            expr,
            range_set,
            children,
        }
    }

    /// The clause this wrapper was built from
    pub fn clause(&self) -> &Expr {
        &self.expr
    }

    /// The partition indices this clause can possibly match
    pub fn range_set(&self) -> &RangeSet {
        &self.range_set
    }

    /// Rebuilds the clause as it applies to one child partition.
    ///
    /// OR-arms whose range set excludes the child are dropped; a
    /// single-arm disjunction collapses to the arm itself. Returns `None`
    /// when the clause cannot match the child at all; callers only ask
    /// about children inside the clause's range set, so `None` at the top
    /// level indicates a caller bug.
    pub fn clause_for_child(&self, index: usize) -> Option<Expr> {
        if !self.range_set.contains(index) {
            return None;
        }

        match &self.expr {
            Expr::Or(_) => {
                let arms: Vec<Expr> = self
                    .children
                    .iter()
                    .filter_map(|arm| arm.clause_for_child(index))
                    .collect();
                match arms.len() {
                    0 => None,
                    1 => arms.into_iter().next(),
                    _ => Some(Expr::Or(arms)),
                }
            }
            Expr::And(_) => {
                let mut arms = Vec::with_capacity(self.children.len());
                for child in &self.children {
                    match child.clause_for_child(index) {
                        Some(arm) => arms.push(arm),
                        // One impossible conjunct makes the whole clause
                        // impossible for this child
                        None => return None,
                    }
                }
                match arms.len() {
                    1 => arms.into_iter().next(),
                    _ => Some(Expr::And(arms)),
                }
            }
            _ => Some(self.expr.clone()),
        }
    }
}
