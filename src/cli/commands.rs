//! CLI command implementations
//!
//! Both commands are one-shot: load the catalog, load the query
//! description, run the rewriters, render, exit. The query file uses
//! fixed relation numbering: the target table is relation 1 and the
//! join's outer table, when present, relation 2.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::{PartitionLookup, PartitionMetadata, PartitionRegistry};
use crate::expr::Expr;
use crate::observability::{Event, Logger};
use crate::planner::{
    build_seqscan_pathlist, JoinKind, PathExplain, PlannerContext, RelationExplain,
};
use crate::rewrite::{
    BaseRelationRewriter, JoinExtraData, JoinHook, JoinRestriction, JoinRewriter, RelationHook,
};

use super::args::{Cli, Command};
use super::errors::CliResult;
use super::io::{read_json, write_output};

/// Join kinds a query file may name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKindSpec {
    #[default]
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKindSpec {
    fn join_kind(self) -> JoinKind {
        match self {
            JoinKindSpec::Inner => JoinKind::Inner,
            JoinKindSpec::Left => JoinKind::Left,
            JoinKindSpec::Right => JoinKind::Right,
            JoinKindSpec::Full => JoinKind::Full,
        }
    }
}

/// Join section of a query file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinSpec {
    /// Outer side of the join (relation 2)
    pub outer_table: String,
    /// Join kind; inner when omitted
    #[serde(default)]
    pub kind: JoinKindSpec,
    /// Join restriction clauses
    #[serde(default)]
    pub clauses: Vec<Expr>,
    /// Base filters on the outer table
    #[serde(default)]
    pub outer_filters: Vec<Expr>,
}

/// One query description file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySpec {
    /// Target table (relation 1)
    pub table: String,
    /// Base filters on the target table
    #[serde(default)]
    pub filters: Vec<Expr>,
    /// Optional join against an outer table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join: Option<JoinSpec>,
}

/// A planned query: the context plus the relations worth rendering
struct Session {
    ctx: PlannerContext,
    target: usize,
    join_rel: Option<usize>,
}

fn build_session(catalog_path: &Path, query_path: &Path) -> CliResult<Session> {
    let metadata: Vec<PartitionMetadata> = read_json(catalog_path)?;
    let registry = PartitionRegistry::new();
    for meta in metadata {
        registry.register(meta)?;
    }
    Logger::info(
        Event::CatalogLoaded.as_str(),
        &[("tables", &registry.len().to_string())],
    );

    let query: QuerySpec = read_json(query_path)?;
    Logger::info(Event::QueryLoaded.as_str(), &[("table", &query.table)]);

    let lookup: Arc<dyn PartitionLookup> = Arc::new(registry);

    let mut ctx = PlannerContext::new();
    let target = ctx.add_base_relation(&query.table, query.filters.clone());
    let outer = query
        .join
        .as_ref()
        .map(|join| ctx.add_base_relation(&join.outer_table, join.outer_filters.clone()));

    let base = BaseRelationRewriter::new(Arc::clone(&lookup));
    base.on_base_relation(&mut ctx, target);
    if let Some(outer) = outer {
        base.on_base_relation(&mut ctx, outer);
    }

    // Default path generation for the relations the rewriter declined
    for rel in [Some(target), outer].into_iter().flatten() {
        if ctx.relations.rel(rel).paths.is_empty() {
            build_seqscan_pathlist(&mut ctx, rel);
        }
    }

    let join_rel = match (&query.join, outer) {
        (Some(join), Some(outer)) => {
            let join_rel = ctx.add_join_relation(outer, target);
            let kind = join.kind.join_kind();
            let extra = JoinExtraData::new(
                kind,
                join.clauses
                    .iter()
                    .cloned()
                    .map(JoinRestriction::join_level)
                    .collect(),
            );
            JoinRewriter::new(lookup).on_join(&mut ctx, join_rel, outer, target, kind, &extra);
            Some(join_rel)
        }
        _ => None,
    };

    Ok(Session {
        ctx,
        target,
        join_rel,
    })
}

/// Renders every candidate path for the query's relations
pub fn explain(catalog_path: &Path, query_path: &Path) -> CliResult<String> {
    let session = build_session(catalog_path, query_path)?;
    let relations = &session.ctx.relations;

    let mut output = format!("{}", RelationExplain::from_relation(relations, session.target));
    if let Some(join_rel) = session.join_rel {
        output.push('\n');
        output.push_str(&format!(
            "{}",
            RelationExplain::from_relation(relations, join_rel)
        ));
    }

    Logger::info(
        Event::ExplainComplete.as_str(),
        &[("relation", &relations.rte(session.target).table.clone())],
    );
    Ok(output)
}

/// Renders the cheapest surviving plan
pub fn plan(catalog_path: &Path, query_path: &Path) -> CliResult<String> {
    let session = build_session(catalog_path, query_path)?;
    let relations = &session.ctx.relations;
    let rel = session.join_rel.unwrap_or(session.target);

    let output = match relations.rel(rel).cheapest_total_path() {
        Some(path) => format!(
            "=== SELECTED PLAN: {} ===\n{}",
            relations.rte(rel).table,
            PathExplain::from_path(relations, path)
        ),
        None => format!(
            "=== SELECTED PLAN: {} ===\nno candidate paths\n",
            relations.rte(rel).table
        ),
    };
    Ok(output)
}

/// Dispatches one parsed command and prints its output
pub fn run_command(command: Command) -> CliResult<()> {
    let output = match command {
        Command::Explain { catalog, query } => explain(&catalog, &query)?,
        Command::Plan { catalog, query } => plan(&catalog, &query)?,
    };
    write_output(&output)
}

/// CLI entry point: parse arguments and dispatch
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_spec_defaults() {
        let query: QuerySpec = serde_json::from_value(json!({ "table": "sales" })).unwrap();
        assert_eq!(query.table, "sales");
        assert!(query.filters.is_empty());
        assert!(query.join.is_none());
    }

    #[test]
    fn test_join_spec_defaults_to_inner() {
        let query: QuerySpec = serde_json::from_value(json!({
            "table": "sales",
            "join": { "outer_table": "orders" }
        }))
        .unwrap();
        let join = query.join.unwrap();
        assert_eq!(join.kind, JoinKindSpec::Inner);
        assert_eq!(join.kind.join_kind(), JoinKind::Inner);
        assert!(join.clauses.is_empty());
    }

    #[test]
    fn test_join_kind_names() {
        let kind: JoinKindSpec = serde_json::from_value(json!("full")).unwrap();
        assert_eq!(kind.join_kind(), JoinKind::Full);
    }
}
