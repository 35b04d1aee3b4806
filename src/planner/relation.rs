//! Relation bookkeeping for one planning session
//!
//! The `RelationTable` owns the per-relation arrays a planning call mutates:
//! one slot per range-table index, holding the range-table entry and the
//! relation descriptor. Slot 0 is reserved; real relations start at index 1.
//!
//! Growth preserves every existing entry at its original index and appends
//! empty slots at the end. A planning call never observes a partially grown
//! table.

use std::collections::BTreeSet;

use crate::expr::Expr;

use super::path::{AccessPath, ParamPathInfo};

/// One range-table entry: the table identifier plus the expansion flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeTableEntry {
    /// Table identifier
    pub table: String,
    /// True once the relation has been expanded into child members
    pub expand: bool,
}

impl RangeTableEntry {
    /// Creates an unexpanded entry
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            expand: false,
        }
    }
}

/// What role a relation plays in the plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// A table named by the query
    Base,
    /// One partition of an expanded base relation
    ChildMember {
        /// Relation index of the expanded parent
        parent: usize,
        /// Position in the parent's ordered child list
        partition_index: usize,
    },
    /// The result of joining two relations
    Join,
}

/// Mutable planning state for one relation
#[derive(Debug, Clone)]
pub struct RelationDescriptor {
    /// Own index in the relation table
    pub index: usize,
    /// Role in the plan
    pub kind: RelationKind,
    /// Residual filter predicates not folded into partitioning
    pub base_filters: Vec<Expr>,
    /// Candidate access paths; only ever appended to once registered
    pub paths: Vec<AccessPath>,
    /// Row estimate
    pub rows: f64,
    /// True when equivalence classes tie this relation to a join
    pub has_eclass_joins: bool,
    /// Join clauses already recorded against this relation
    pub join_clauses: Vec<Expr>,
    /// Parameterized-path records, one per distinct required-outer set
    pub param_infos: Vec<ParamPathInfo>,
    /// First materialized child, once the relation has been expanded
    pub first_child: Option<usize>,
}

impl RelationDescriptor {
    /// Creates a base relation with the given filters
    pub fn new_base(index: usize, base_filters: Vec<Expr>) -> Self {
        Self {
            index,
            kind: RelationKind::Base,
            base_filters,
            paths: Vec::new(),
            rows: 0.0,
            has_eclass_joins: false,
            join_clauses: Vec::new(),
            param_infos: Vec::new(),
            first_child: None,
        }
    }

    /// Creates a child member of an expanded relation
    pub fn new_child(
        index: usize,
        parent: usize,
        partition_index: usize,
        base_filters: Vec<Expr>,
    ) -> Self {
        Self {
            index,
            kind: RelationKind::ChildMember {
                parent,
                partition_index,
            },
            base_filters,
            paths: Vec::new(),
            rows: 0.0,
            has_eclass_joins: false,
            join_clauses: Vec::new(),
            param_infos: Vec::new(),
            first_child: None,
        }
    }

    /// Creates a join result relation
    pub fn new_join(index: usize) -> Self {
        Self {
            index,
            kind: RelationKind::Join,
            base_filters: Vec::new(),
            paths: Vec::new(),
            rows: 0.0,
            has_eclass_joins: false,
            join_clauses: Vec::new(),
            param_infos: Vec::new(),
            first_child: None,
        }
    }

    /// Registers a new candidate path. Paths are immutable once added.
    pub fn add_path(&mut self, path: AccessPath) {
        self.paths.push(path);
    }

    /// Cheapest path by total cost, earliest registration winning ties
    pub fn cheapest_total_path(&self) -> Option<&AccessPath> {
        let mut best: Option<&AccessPath> = None;
        for path in &self.paths {
            match best {
                Some(current) if current.cost.total <= path.cost.total => {}
                _ => best = Some(path),
            }
        }
        best
    }

    /// Looks up the parameterized-path record for a required-outer set,
    /// constructing it on first use
    pub fn param_info(&mut self, required_outer: &BTreeSet<usize>) -> ParamPathInfo {
        if let Some(existing) = self
            .param_infos
            .iter()
            .find(|info| &info.required_outer == required_outer)
        {
            return existing.clone();
        }
        let info = ParamPathInfo {
            required_outer: required_outer.clone(),
        };
        self.param_infos.push(info.clone());
        info
    }
}

/// The session-owned per-relation arrays
#[derive(Debug, Default)]
pub struct RelationTable {
    rels: Vec<Option<RelationDescriptor>>,
    rtes: Vec<Option<RangeTableEntry>>,
}

impl RelationTable {
    /// Creates a table with only the reserved slot 0
    pub fn new() -> Self {
        Self {
            rels: vec![None],
            rtes: vec![None],
        }
    }

    /// Number of slots, including empty ones
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    /// Returns true if no relation has been added
    pub fn is_empty(&self) -> bool {
        self.rels.iter().all(Option::is_none)
    }

    /// Appends a relation in the next slot and returns its index
    pub fn push(&mut self, rte: RangeTableEntry, mut rel: RelationDescriptor) -> usize {
        let index = self.rels.len();
        rel.index = index;
        self.rels.push(Some(rel));
        self.rtes.push(Some(rte));
        index
    }

    /// Grows both arrays by `by` empty slots.
    ///
    /// Every existing entry stays at its original index; the new slots are
    /// appended at the end. The replacement is not observable half-done.
    pub fn grow(&mut self, by: usize) {
        let new_len = self.rels.len() + by;
        self.rels.resize_with(new_len, || None);
        self.rtes.resize_with(new_len, || None);
    }

    /// Fills one empty slot. Filling an occupied slot is a logic error.
    pub fn set(&mut self, index: usize, rte: RangeTableEntry, mut rel: RelationDescriptor) {
        if self.rels[index].is_some() || self.rtes[index].is_some() {
            panic!("relation table slot {} is already occupied", index);
        }
        rel.index = index;
        self.rels[index] = Some(rel);
        self.rtes[index] = Some(rte);
    }

    /// First empty slot after the reserved one, if any
    pub fn first_empty_slot(&self) -> Option<usize> {
        (1..self.rels.len()).find(|&i| self.rels[i].is_none())
    }

    /// Relation descriptor at `index`, if the slot is filled
    pub fn get_rel(&self, index: usize) -> Option<&RelationDescriptor> {
        self.rels.get(index).and_then(Option::as_ref)
    }

    /// Range-table entry at `index`, if the slot is filled
    pub fn get_rte(&self, index: usize) -> Option<&RangeTableEntry> {
        self.rtes.get(index).and_then(Option::as_ref)
    }

    /// Relation descriptor at `index`; the slot must be filled
    pub fn rel(&self, index: usize) -> &RelationDescriptor {
        match self.get_rel(index) {
            Some(rel) => rel,
            None => panic!("no relation at index {}", index),
        }
    }

    /// Mutable relation descriptor at `index`; the slot must be filled
    pub fn rel_mut(&mut self, index: usize) -> &mut RelationDescriptor {
        match self.rels.get_mut(index).and_then(Option::as_mut) {
            Some(rel) => rel,
            None => panic!("no relation at index {}", index),
        }
    }

    /// Range-table entry at `index`; the slot must be filled
    pub fn rte(&self, index: usize) -> &RangeTableEntry {
        match self.get_rte(index) {
            Some(rte) => rte,
            None => panic!("no range-table entry at index {}", index),
        }
    }

    /// Mutable range-table entry at `index`; the slot must be filled
    pub fn rte_mut(&mut self, index: usize) -> &mut RangeTableEntry {
        match self.rtes.get_mut(index).and_then(Option::as_mut) {
            Some(rte) => rte,
            None => panic!("no range-table entry at index {}", index),
        }
    }

    /// Child members of `parent`, ordered by partition index
    pub fn children_of(&self, parent: usize) -> Vec<usize> {
        let mut children: Vec<(usize, usize)> = self
            .rels
            .iter()
            .flatten()
            .filter_map(|rel| match rel.kind {
                RelationKind::ChildMember {
                    parent: p,
                    partition_index,
                } if p == parent => Some((partition_index, rel.index)),
                _ => None,
            })
            .collect();
        children.sort_by_key(|&(partition_index, _)| partition_index);
        children.into_iter().map(|(_, index)| index).collect()
    }
}
