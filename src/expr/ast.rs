//! Filter expression trees
//!
//! Expressions are built by the query front end and consumed by the
//! translator and the plan rewriters. All predicates over one relation are
//! implicitly conjunctive; `And`/`Or`/`Not` exist for clause-internal
//! structure.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CmpOp {
    /// Equality: column = operand
    Eq,
    /// Less than: column < operand
    Lt,
    /// Less than or equal: column <= operand
    Lte,
    /// Greater than: column > operand
    Gt,
    /// Greater than or equal: column >= operand
    Gte,
}

impl CmpOp {
    /// Returns the operator name for explain output
    pub fn as_str(&self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Lt => "<",
            CmpOp::Lte => "<=",
            CmpOp::Gt => ">",
            CmpOp::Gte => ">=",
        }
    }
}

/// A boolean filter expression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    /// Column reference: relation index plus column name
    Column { rel: usize, name: String },
    /// Constant value
    Literal(Value),
    /// Join parameter: a column of an as-yet-unbound outer relation
    Param { rel: usize, name: String },
    /// Comparison between a column and an operand (literal or parameter)
    Cmp {
        op: CmpOp,
        column: Box<Expr>,
        operand: Box<Expr>,
    },
    /// Conjunction of sub-expressions
    And(Vec<Expr>),
    /// Disjunction of sub-expressions
    Or(Vec<Expr>),
    /// Negation
    Not(Box<Expr>),
}

impl Expr {
    /// Creates a column reference
    pub fn column(rel: usize, name: impl Into<String>) -> Self {
        Expr::Column {
            rel,
            name: name.into(),
        }
    }

    /// Creates a join parameter reference
    pub fn param(rel: usize, name: impl Into<String>) -> Self {
        Expr::Param {
            rel,
            name: name.into(),
        }
    }

    /// Compares a column against a constant
    pub fn compare(op: CmpOp, rel: usize, column: impl Into<String>, value: Value) -> Self {
        Expr::Cmp {
            op,
            column: Box::new(Expr::column(rel, column)),
            operand: Box::new(Expr::Literal(value)),
        }
    }

    /// Compares a column against an outer relation's column
    pub fn compare_param(
        op: CmpOp,
        rel: usize,
        column: impl Into<String>,
        outer_rel: usize,
        outer_column: impl Into<String>,
    ) -> Self {
        Expr::Cmp {
            op,
            column: Box::new(Expr::column(rel, column)),
            operand: Box::new(Expr::param(outer_rel, outer_column)),
        }
    }

    /// Conjunction builder
    pub fn and_all(exprs: Vec<Expr>) -> Self {
        Expr::And(exprs)
    }

    /// Disjunction builder
    pub fn or_all(exprs: Vec<Expr>) -> Self {
        Expr::Or(exprs)
    }

    /// Negation builder
    pub fn negate(expr: Expr) -> Self {
        Expr::Not(Box::new(expr))
    }

    /// Returns true if any `Param` leaf occurs in the tree
    pub fn contains_params(&self) -> bool {
        match self {
            Expr::Param { .. } => true,
            Expr::Column { .. } | Expr::Literal(_) => false,
            Expr::Cmp { column, operand, .. } => {
                column.contains_params() || operand.contains_params()
            }
            Expr::And(items) | Expr::Or(items) => items.iter().any(Expr::contains_params),
            Expr::Not(inner) => inner.contains_params(),
        }
    }

    /// Collects the relations referenced by `Param` leaves into `out`
    pub fn collect_param_rels(&self, out: &mut std::collections::BTreeSet<usize>) {
        match self {
            Expr::Param { rel, .. } => {
                out.insert(*rel);
            }
            Expr::Column { .. } | Expr::Literal(_) => {}
            Expr::Cmp { column, operand, .. } => {
                column.collect_param_rels(out);
                operand.collect_param_rels(out);
            }
            Expr::And(items) | Expr::Or(items) => {
                for item in items {
                    item.collect_param_rels(out);
                }
            }
            Expr::Not(inner) => inner.collect_param_rels(out),
        }
    }

    /// Relations referenced by `Param` leaves in the tree
    pub fn param_rels(&self) -> std::collections::BTreeSet<usize> {
        let mut out = std::collections::BTreeSet::new();
        self.collect_param_rels(&mut out);
        out
    }

    /// Rewrites every column reference of relation `from` to relation `to`.
    /// Parameters are left untouched; they already name a different relation.
    pub fn rewrite_rel(&self, from: usize, to: usize) -> Expr {
        match self {
            Expr::Column { rel, name } if *rel == from => Expr::column(to, name.clone()),
            Expr::Column { .. } | Expr::Literal(_) | Expr::Param { .. } => self.clone(),
            Expr::Cmp { op, column, operand } => Expr::Cmp {
                op: *op,
                column: Box::new(column.rewrite_rel(from, to)),
                operand: Box::new(operand.rewrite_rel(from, to)),
            },
            Expr::And(items) => {
                Expr::And(items.iter().map(|e| e.rewrite_rel(from, to)).collect())
            }
            Expr::Or(items) => Expr::Or(items.iter().map(|e| e.rewrite_rel(from, to)).collect()),
            Expr::Not(inner) => Expr::Not(Box::new(inner.rewrite_rel(from, to))),
        }
    }

    /// Replaces bound parameters with literals. Parameters without a binding
    /// survive unchanged.
    pub fn bind_params<F>(&self, resolve: &F) -> Expr
    where
        F: Fn(usize, &str) -> Option<Value>,
    {
        match self {
            Expr::Param { rel, name } => match resolve(*rel, name) {
                Some(value) => Expr::Literal(value),
                None => self.clone(),
            },
            Expr::Column { .. } | Expr::Literal(_) => self.clone(),
            Expr::Cmp { op, column, operand } => Expr::Cmp {
                op: *op,
                column: Box::new(column.bind_params(resolve)),
                operand: Box::new(operand.bind_params(resolve)),
            },
            Expr::And(items) => Expr::And(items.iter().map(|e| e.bind_params(resolve)).collect()),
            Expr::Or(items) => Expr::Or(items.iter().map(|e| e.bind_params(resolve)).collect()),
            Expr::Not(inner) => Expr::Not(Box::new(inner.bind_params(resolve))),
        }
    }

    /// Renders the expression for explain output
    pub fn render(&self) -> String {
        match self {
            Expr::Column { name, .. } => name.clone(),
            Expr::Literal(value) => value.to_string(),
            Expr::Param { rel, name } => format!("${}.{}", rel, name),
            Expr::Cmp { op, column, operand } => {
                format!("{} {} {}", column.render(), op.as_str(), operand.render())
            }
            Expr::And(items) => {
                let parts: Vec<String> = items.iter().map(Expr::render).collect();
                format!("({})", parts.join(" AND "))
            }
            Expr::Or(items) => {
                let parts: Vec<String> = items.iter().map(Expr::render).collect();
                format!("({})", parts.join(" OR "))
            }
            Expr::Not(inner) => format!("NOT {}", inner.render()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_contains_params() {
        let plain = Expr::compare(CmpOp::Eq, 1, "key", json!(5));
        assert!(!plain.contains_params());

        let parameterized = Expr::compare_param(CmpOp::Eq, 1, "key", 2, "value");
        assert!(parameterized.contains_params());

        let nested = Expr::or_all(vec![plain, parameterized]);
        assert!(nested.contains_params());
    }

    #[test]
    fn test_param_rels() {
        let expr = Expr::and_all(vec![
            Expr::compare(CmpOp::Gte, 1, "key", json!(15)),
            Expr::compare_param(CmpOp::Eq, 1, "key", 2, "value"),
            Expr::compare_param(CmpOp::Eq, 1, "region", 4, "region"),
        ]);
        let rels: Vec<usize> = expr.param_rels().into_iter().collect();
        assert_eq!(rels, vec![2, 4]);
        assert!(Expr::compare(CmpOp::Eq, 1, "key", json!(1))
            .param_rels()
            .is_empty());
    }

    #[test]
    fn test_rewrite_rel_changes_only_matching_columns() {
        let expr = Expr::compare_param(CmpOp::Eq, 5, "key", 2, "value");
        let rewritten = expr.rewrite_rel(5, 1);

        assert_eq!(
            rewritten,
            Expr::compare_param(CmpOp::Eq, 1, "key", 2, "value")
        );
        // A second rewrite with a non-matching source is a no-op
        assert_eq!(rewritten.rewrite_rel(5, 9), rewritten);
    }

    #[test]
    fn test_bind_params_substitutes_literals() {
        let expr = Expr::compare_param(CmpOp::Eq, 1, "key", 2, "value");
        let bound = expr.bind_params(&|rel, name| {
            (rel == 2 && name == "value").then(|| json!(17))
        });

        assert_eq!(bound, Expr::compare(CmpOp::Eq, 1, "key", json!(17)));
        assert!(!bound.contains_params());
    }

    #[test]
    fn test_bind_params_leaves_unbound() {
        let expr = Expr::compare_param(CmpOp::Eq, 1, "key", 2, "value");
        let bound = expr.bind_params(&|_, _| None);
        assert!(bound.contains_params());
    }

    #[test]
    fn test_render() {
        let expr = Expr::or_all(vec![
            Expr::compare(CmpOp::Lt, 1, "key", json!(5)),
            Expr::compare(CmpOp::Gte, 1, "key", json!(35)),
        ]);
        assert_eq!(expr.render(), "(key < 5 OR key >= 35)");
    }
}
