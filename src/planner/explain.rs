//! Deterministic rendering of candidate paths
//!
//! Explain output is plain text with a fixed layout: same relation state,
//! same bytes. Used by the CLI and by tests that assert on plan shape.

use std::collections::BTreeSet;
use std::fmt;

use super::path::{AccessPath, PathKind};
use super::relation::RelationTable;

/// Rendered view of one relation's candidate pool
#[derive(Debug, Clone)]
pub struct RelationExplain {
    table: String,
    rows: f64,
    paths: Vec<String>,
}

impl RelationExplain {
    /// Renders every candidate path of one relation
    pub fn from_relation(relations: &RelationTable, rel_index: usize) -> Self {
        let rel = relations.rel(rel_index);
        let paths = rel
            .paths
            .iter()
            .enumerate()
            .map(|(i, path)| {
                let mut out = String::new();
                out.push_str(&format!("Path {}: ", i + 1));
                render_path(relations, path, 0, &mut out);
                out
            })
            .collect();

        Self {
            table: relations.rte(rel_index).table.clone(),
            rows: rel.rows,
            paths,
        }
    }
}

impl fmt::Display for RelationExplain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== CANDIDATE PATHS: {} ===", self.table)?;
        writeln!(f, "Rows: {:.2}", self.rows)?;
        for path in &self.paths {
            write!(f, "{}", path)?;
        }
        Ok(())
    }
}

/// Rendered view of a single path tree
#[derive(Debug, Clone)]
pub struct PathExplain {
    rendered: String,
}

impl PathExplain {
    /// Renders one path, nested sub-paths indented
    pub fn from_path(relations: &RelationTable, path: &AccessPath) -> Self {
        let mut rendered = String::new();
        render_path(relations, path, 0, &mut rendered);
        Self { rendered }
    }
}

impl fmt::Display for PathExplain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rendered)
    }
}

fn render_required(required: &BTreeSet<usize>) -> String {
    if required.is_empty() {
        return String::new();
    }
    let items: Vec<String> = required.iter().map(usize::to_string).collect();
    format!(" requires={{{}}}", items.join(","))
}

fn render_path(relations: &RelationTable, path: &AccessPath, depth: usize, out: &mut String) {
    let pad = "  ".repeat(depth);

    out.push_str(&format!(
        "{} {} (startup={:.2} total={:.2} rows={:.2})",
        path.kind_name(),
        relations.rte(path.rel).table,
        path.cost.startup,
        path.cost.total,
        path.rows
    ));
    if let Some(ordering) = &path.ordering {
        out.push_str(&format!(
            " ordering={} {}",
            ordering.column,
            ordering.direction.as_str()
        ));
    }
    out.push_str(&render_required(&path.required_outer));
    out.push('\n');

    match &path.kind {
        PathKind::SeqScan => {}
        PathKind::Fanout { children } => {
            render_children(relations, children, &pad, out);
        }
        PathKind::PickyFanout {
            children,
            pushdown_quals,
            ..
        } => {
            let quals: Vec<String> = pushdown_quals.iter().map(|q| q.render()).collect();
            out.push_str(&format!("{}  Prune by: {}\n", pad, quals.join(" AND ")));
            render_children(relations, children, &pad, out);
        }
        PathKind::NestLoop {
            outer,
            inner,
            join_kind,
            ..
        } => {
            out.push_str(&format!("{}  Join kind: {}\n", pad, join_kind.as_str()));
            out.push_str(&format!("{}  Outer: ", pad));
            render_path(relations, outer, depth + 1, out);
            out.push_str(&format!("{}  Inner: ", pad));
            render_path(relations, inner, depth + 1, out);
        }
    }
}

fn render_children(
    relations: &RelationTable,
    children: &[AccessPath],
    pad: &str,
    out: &mut String,
) {
    let names: Vec<&str> = children
        .iter()
        .map(|child| relations.rte(child.rel).table.as_str())
        .collect();
    if names.is_empty() {
        out.push_str(&format!("{}  Children: none\n", pad));
    } else {
        out.push_str(&format!("{}  Children: {}\n", pad, names.join(", ")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ChildPartition, PartitionMetadata};
    use crate::planner::context::PlannerContext;
    use crate::planner::path::SortOrdering;
    use crate::planner::pathgen::{build_fanout_paths, materialize_child};
    use serde_json::json;

    fn expanded_context() -> (PlannerContext, usize) {
        let meta = PartitionMetadata::range("sales", "key")
            .with_child(ChildPartition::bounded("sales_0", json!(0), json!(10)))
            .with_child(ChildPartition::bounded("sales_1", json!(10), json!(20)));

        let mut ctx = PlannerContext::new();
        let parent = ctx.add_base_relation("sales", Vec::new());
        ctx.relations.grow(2);
        materialize_child(&mut ctx, parent, 0, &meta.children[0], &[]);
        materialize_child(&mut ctx, parent, 1, &meta.children[1], &[]);
        build_fanout_paths(&mut ctx, parent, &[SortOrdering::asc("key")]);
        (ctx, parent)
    }

    #[test]
    fn test_explain_lists_children_and_ordering() {
        let (ctx, parent) = expanded_context();
        let output = format!("{}", RelationExplain::from_relation(&ctx.relations, parent));

        assert!(output.contains("CANDIDATE PATHS: sales"));
        assert!(output.contains("Children: sales_0, sales_1"));
        assert!(output.contains("ordering=key asc"));
    }

    #[test]
    fn test_explain_deterministic() {
        let (ctx, parent) = expanded_context();
        let first = format!("{}", RelationExplain::from_relation(&ctx.relations, parent));
        let second = format!("{}", RelationExplain::from_relation(&ctx.relations, parent));
        assert_eq!(first, second);
    }
}
