//! Planning-session context
//!
//! One `PlannerContext` lives for exactly one planning call. It owns the
//! relation table and the session flags the rewriters consult; nothing in
//! it is shared across sessions.

use crate::expr::Expr;

use super::relation::{RangeTableEntry, RelationDescriptor, RelationTable};

/// The kind of statement being planned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Top-level read query
    Select,
    /// Anything that writes
    Modify,
}

/// Per-session planning state
#[derive(Debug)]
pub struct PlannerContext {
    /// The session-owned relation arrays
    pub relations: RelationTable,
    /// Statement kind
    pub query_kind: QueryKind,
    /// Partition pruning feature switch
    pub pruning_enabled: bool,
    /// True when default inheritance expansion was suppressed upstream,
    /// leaving expansion to the base rewriter
    pub expansion_suppressed: bool,
}

impl PlannerContext {
    /// Context for a top-level read query with pruning enabled
    pub fn new() -> Self {
        Self {
            relations: RelationTable::new(),
            query_kind: QueryKind::Select,
            pruning_enabled: true,
            expansion_suppressed: true,
        }
    }

    /// Adds a base relation with its filter predicates; returns its index
    pub fn add_base_relation(&mut self, table: impl Into<String>, filters: Vec<Expr>) -> usize {
        self.relations.push(
            RangeTableEntry::new(table),
            RelationDescriptor::new_base(0, filters),
        )
    }

    /// Adds a join result relation; returns its index
    pub fn add_join_relation(&mut self, outer: usize, inner: usize) -> usize {
        let name = format!(
            "({} join {})",
            self.relations.rte(outer).table,
            self.relations.rte(inner).table
        );
        self.relations
            .push(RangeTableEntry::new(name), RelationDescriptor::new_join(0))
    }
}

impl Default for PlannerContext {
    fn default() -> Self {
        Self::new()
    }
}
