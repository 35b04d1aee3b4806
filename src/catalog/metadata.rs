//! Partition metadata structures
//!
//! A `PartitionMetadata` declares one table as partitioned: the partition
//! column, the strategy, and the ordered children. Range children carry
//! half-open value bounds `[lower, upper)`; either side may be unbounded
//! at the edges of the key space.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::expr::compare_values;

use super::errors::{CatalogError, CatalogResult};

/// Partitioning strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionStrategy {
    /// Children hold contiguous, ordered key ranges
    Range,
    /// Children hold keys routed by a deterministic hash
    Hash,
}

/// One child partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildPartition {
    /// Child table identifier
    pub id: String,
    /// Inclusive lower bound; `None` means unbounded below
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<Value>,
    /// Exclusive upper bound; `None` means unbounded above
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<Value>,
}

impl ChildPartition {
    /// A range child covering `[lower, upper)`
    pub fn bounded(id: impl Into<String>, lower: Value, upper: Value) -> Self {
        Self {
            id: id.into(),
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    /// A range child covering everything below `upper`
    pub fn below(id: impl Into<String>, upper: Value) -> Self {
        Self {
            id: id.into(),
            lower: None,
            upper: Some(upper),
        }
    }

    /// A range child covering everything at or above `lower`
    pub fn at_or_above(id: impl Into<String>, lower: Value) -> Self {
        Self {
            id: id.into(),
            lower: Some(lower),
            upper: None,
        }
    }

    /// A hash child (no bounds)
    pub fn hashed(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            lower: None,
            upper: None,
        }
    }
}

/// Partitioning declaration for one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionMetadata {
    /// Parent table name
    pub table: String,
    /// Partition column name
    pub column: String,
    /// Partitioning strategy
    pub strategy: PartitionStrategy,
    /// Ordered children; index `i` is stable for a planning pass
    pub children: Vec<ChildPartition>,
}

impl PartitionMetadata {
    /// Creates a range-partitioned declaration
    pub fn range(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            strategy: PartitionStrategy::Range,
            children: Vec::new(),
        }
    }

    /// Creates a hash-partitioned declaration
    pub fn hash(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            strategy: PartitionStrategy::Hash,
            children: Vec::new(),
        }
    }

    /// Adds a child (builder style)
    pub fn with_child(mut self, child: ChildPartition) -> Self {
        self.children.push(child);
        self
    }

    /// Number of children
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Routes a value to the hash child index holding it
    pub fn hash_child_index(&self, value: &Value) -> usize {
        // Deterministic routing: crc32 over the canonical JSON encoding
        let encoded = value.to_string();
        let digest = crc32fast::hash(encoded.as_bytes());
        (digest as usize) % self.children.len().max(1)
    }

    /// Validates the declaration invariants.
    ///
    /// Checks (strict order):
    /// 1. At least one child
    /// 2. No duplicate child identifiers
    /// 3. Range only: each child's bounds comparable and in order,
    ///    consecutive children non-overlapping
    pub fn validate(&self) -> CatalogResult<()> {
        if self.children.is_empty() {
            return Err(CatalogError::no_children(&self.table));
        }

        for (i, child) in self.children.iter().enumerate() {
            if self.children[..i].iter().any(|c| c.id == child.id) {
                return Err(CatalogError::duplicate_child(&self.table, &child.id));
            }
        }

        if self.strategy == PartitionStrategy::Range {
            self.validate_range_bounds()?;
        }

        Ok(())
    }

    fn validate_range_bounds(&self) -> CatalogResult<()> {
        use std::cmp::Ordering;

        for (i, child) in self.children.iter().enumerate() {
            // A child's own bounds must be in order
            if let (Some(lower), Some(upper)) = (&child.lower, &child.upper) {
                match compare_values(lower, upper) {
                    Some(Ordering::Less) => {}
                    _ => return Err(CatalogError::unordered_bounds(&self.table, &child.id)),
                }
            }

            // Only the first child may be unbounded below, only the last
            // unbounded above
            if child.lower.is_none() && i != 0 {
                return Err(CatalogError::unordered_bounds(&self.table, &child.id));
            }
            if child.upper.is_none() && i != self.children.len() - 1 {
                return Err(CatalogError::unordered_bounds(&self.table, &child.id));
            }

            if i > 0 {
                let prev = &self.children[i - 1];
                let (prev_upper, lower) = match (&prev.upper, &child.lower) {
                    (Some(u), Some(l)) => (u, l),
                    // Covered by the unbounded-position checks above
                    _ => continue,
                };
                match compare_values(prev_upper, lower) {
                    Some(Ordering::Less) | Some(Ordering::Equal) => {}
                    Some(Ordering::Greater) => {
                        return Err(CatalogError::overlapping_bounds(&self.table, &child.id));
                    }
                    None => {
                        return Err(CatalogError::unordered_bounds(&self.table, &child.id));
                    }
                }
            }
        }

        Ok(())
    }
}
