//! Deterministic cost model
//!
//! Same inputs always produce the same estimate; there is no sampling and
//! no clock input. The constants are coarse on purpose: candidates built
//! here only need a stable relative order, not absolute accuracy.

use super::path::{AccessPath, Cost};

/// Cost to process one row
pub const CPU_TUPLE_COST: f64 = 0.01;
/// Fixed cost to open one child scan
pub const CHILD_STARTUP_COST: f64 = 1.0;
/// Rows assumed per partition before filtering
pub const DEFAULT_CHILD_ROWS: f64 = 1000.0;
/// Fraction of rows assumed to survive one filter predicate
pub const FILTER_SELECTIVITY: f64 = 0.5;
/// Fraction of children a parameterized fan-out is assumed to scan
/// once its parameters are bound
pub const RUNTIME_PRUNE_SELECTIVITY: f64 = 0.25;
/// Fraction of the cross product assumed to survive a join
pub const JOIN_SELECTIVITY: f64 = 0.1;

/// Row estimate for one table or partition scan after applying its
/// residual filters
pub fn filtered_rows(filter_count: usize) -> f64 {
    DEFAULT_CHILD_ROWS * FILTER_SELECTIVITY.powi(filter_count as i32)
}

/// Cost of scanning `rows` rows front to back
pub fn seq_scan_cost(rows: f64) -> Cost {
    Cost {
        startup: CHILD_STARTUP_COST,
        total: CHILD_STARTUP_COST + rows * CPU_TUPLE_COST,
    }
}

/// Cost of a fan-out over the given children: the sum of the child costs
pub fn fanout_cost(children: &[AccessPath]) -> Cost {
    children.iter().fold(Cost::zero(), |acc, child| Cost {
        startup: acc.startup + child.cost.startup,
        total: acc.total + child.cost.total,
    })
}

/// Row estimate for a fan-out: the sum of the child estimates
pub fn fanout_rows(children: &[AccessPath]) -> f64 {
    children.iter().map(|child| child.rows).sum()
}

/// Cost and rows for a parameterized fan-out.
///
/// Bound parameters let the node skip children at run time, so both the
/// summed cost and the row estimate shrink by the pruning selectivity.
pub fn picky_fanout_estimate(children: &[AccessPath]) -> (f64, Cost) {
    let base = fanout_cost(children);
    let rows = fanout_rows(children) * RUNTIME_PRUNE_SELECTIVITY;
    let cost = Cost {
        startup: base.startup * RUNTIME_PRUNE_SELECTIVITY,
        total: base.total * RUNTIME_PRUNE_SELECTIVITY,
    };
    (rows, cost)
}

/// Nested-loop cost: scan the outer once, rescan the inner per outer row
pub fn initial_nestloop_cost(outer: &AccessPath, inner: &AccessPath) -> Cost {
    let rescans = if outer.rows < 1.0 { 1.0 } else { outer.rows };
    Cost {
        startup: outer.cost.startup + inner.cost.startup,
        total: outer.cost.total + rescans * inner.cost.total,
    }
}

/// Row estimate for a nested-loop join
pub fn nestloop_rows(outer: &AccessPath, inner: &AccessPath) -> f64 {
    outer.rows * inner.rows * JOIN_SELECTIVITY
}
