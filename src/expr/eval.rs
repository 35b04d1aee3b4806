//! Strict row-level expression evaluation
//!
//! Filters rows strictly: no type coercion, no expressions over fields.
//! Numbers compare as numbers, strings as strings; everything else never
//! matches. Missing fields and nulls never match.

use std::cmp::Ordering;

use serde_json::Value;

use super::ast::{CmpOp, Expr};

/// Strict three-way comparison between two values.
///
/// Returns `None` when the values are not comparable (mixed types, nulls,
/// or non-scalar values). A non-comparable pair never satisfies any
/// predicate.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            // Integer comparison when both sides are integers, to avoid
            // precision loss on large values
            if let (Some(xi), Some(yi)) = (x.as_i64(), y.as_i64()) {
                return Some(xi.cmp(&yi));
            }
            let (xf, yf) = (x.as_f64()?, y.as_f64()?);
            xf.partial_cmp(&yf)
        }
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Returns true if `actual op expected` holds under strict comparison
pub fn cmp_matches(op: CmpOp, actual: &Value, expected: &Value) -> bool {
    match compare_values(actual, expected) {
        Some(ordering) => match op {
            CmpOp::Eq => ordering == Ordering::Equal,
            CmpOp::Lt => ordering == Ordering::Less,
            CmpOp::Lte => ordering != Ordering::Greater,
            CmpOp::Gt => ordering == Ordering::Greater,
            CmpOp::Gte => ordering != Ordering::Less,
        },
        None => false,
    }
}

/// Evaluates filter expressions against rows
pub struct RowFilter;

impl RowFilter {
    /// Checks if a row matches all predicates (AND semantics)
    pub fn matches(row: &Value, predicates: &[Expr]) -> bool {
        predicates.iter().all(|pred| Self::eval(row, pred))
    }

    /// Evaluates a single expression against a row.
    ///
    /// Unbound parameters make a comparison false: a predicate that cannot
    /// be resolved cannot admit the row.
    pub fn eval(row: &Value, expr: &Expr) -> bool {
        match expr {
            Expr::And(items) => items.iter().all(|e| Self::eval(row, e)),
            Expr::Or(items) => items.iter().any(|e| Self::eval(row, e)),
            Expr::Not(inner) => !Self::eval(row, inner),
            Expr::Cmp { op, column, operand } => {
                let field = match column.as_ref() {
                    Expr::Column { name, .. } => name,
                    _ => return false,
                };
                let actual = match row.get(field) {
                    Some(v) if !v.is_null() => v,
                    _ => return false,
                };
                let expected = match operand.as_ref() {
                    Expr::Literal(v) => v,
                    // Unbound parameter or column operand
                    _ => return false,
                };
                cmp_matches(*op, actual, expected)
            }
            // Bare leaves are not boolean predicates
            Expr::Column { .. } | Expr::Literal(_) | Expr::Param { .. } => false,
        }
    }
}
