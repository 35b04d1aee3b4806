//! Picky fan-out construction and the upgrade pass
//!
//! A picky fan-out carries predicates whose parameters are unbound at plan
//! time. Once the executor binds them, the node re-derives the eligible
//! partitions and scans only those children. Building one is strictly
//! additive: the original fan-out stays in the candidate pool.

use crate::expr::Expr;
use crate::observability::{Event, Logger};
use crate::planner::{
    picky_fanout_estimate, AccessPath, ParamPathInfo, PathKind, PlannerContext,
};

/// Builds a picky fan-out from an existing fan-out path.
///
/// Returns `None` when the upgrade is unsound or pointless: no pushdown
/// predicates, or a predicate that no parameter binding could ever narrow
/// (such a predicate belongs to the base rewrite, not here).
///
/// Children are re-parameterized under the record's required-outer set so
/// each of them can evaluate the bound predicates.
pub fn create_picky_path(
    fanout: &AccessPath,
    param_info: ParamPathInfo,
    pushdown_quals: Vec<Expr>,
) -> Option<AccessPath> {
    let children = match &fanout.kind {
        PathKind::Fanout { children } => children,
        _ => return None,
    };

    if pushdown_quals.is_empty() {
        return None;
    }
    if pushdown_quals.iter().any(|qual| !qual.contains_params()) {
        return None;
    }

    let children: Vec<AccessPath> = children
        .iter()
        .map(|child| {
            let mut reparam = child.clone();
            reparam
                .required_outer
                .extend(param_info.required_outer.iter().copied());
            reparam
        })
        .collect();

    let (rows, cost) = picky_fanout_estimate(&children);
    let required_outer = param_info.required_outer.clone();

    Some(AccessPath {
        rel: fanout.rel,
        kind: PathKind::PickyFanout {
            children,
            pushdown_quals,
            param_info,
        },
        rows,
        cost,
        ordering: fanout.ordering.clone(),
        required_outer,
    })
}

/// Upgrades a relation's fan-out paths in place.
///
/// For each fan-out whose children carry only parameterized residual
/// filters, registers one picky variant alongside it. A child residual
/// with no parameter reference disqualifies the whole path: that filter
/// was already exploited when the children were materialized, so deferring
/// it buys nothing.
pub fn upgrade_fanout_paths(ctx: &mut PlannerContext, rel_index: usize) {
    {
        let rel = ctx.relations.rel(rel_index);
        // A relation already entangled with joins has per-child state this
        // pass does not track
        if rel.has_eclass_joins || !rel.join_clauses.is_empty() {
            return;
        }
    }

    let candidates: Vec<AccessPath> = ctx
        .relations
        .rel(rel_index)
        .paths
        .iter()
        .filter(|path| path.is_fanout())
        .cloned()
        .collect();

    for fanout in candidates {
        let children = match &fanout.kind {
            PathKind::Fanout { children } => children,
            _ => continue,
        };

        let param_info = ctx
            .relations
            .rel_mut(rel_index)
            .param_info(&fanout.required_outer);

        let mut picky_quals: Vec<Expr> = Vec::new();
        let mut disqualified = false;

        for child in children {
            let residuals = ctx.relations.rel(child.rel).base_filters.clone();

            if residuals.iter().any(|qual| !qual.contains_params()) {
                disqualified = true;
                break;
            }

            for qual in residuals {
                let rewritten = qual.rewrite_rel(child.rel, rel_index);
                if !picky_quals.contains(&rewritten) {
                    picky_quals.push(rewritten);
                }
            }
        }

        if disqualified || picky_quals.is_empty() {
            continue;
        }

        if let Some(picky) = create_picky_path(&fanout, param_info, picky_quals) {
            let table = ctx.relations.rte(rel_index).table.clone();
            let quals = match &picky.kind {
                PathKind::PickyFanout { pushdown_quals, .. } => pushdown_quals.len(),
                _ => 0,
            };
            ctx.relations.rel_mut(rel_index).add_path(picky);
            Logger::trace(
                Event::PickyPathAdded.as_str(),
                &[("quals", &quals.to_string()), ("table", &table)],
            );
        }
    }
}
