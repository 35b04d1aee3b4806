//! Partition registry
//!
//! Read-mostly map from table name to partition metadata. The rewriters
//! only ever look up; registration and removal happen outside any planning
//! call (DDL-time in the host system).

use std::collections::HashMap;
use std::sync::RwLock;

use super::errors::{CatalogError, CatalogResult};
use super::metadata::PartitionMetadata;

/// Read-only lookup seam the rewriters depend on
pub trait PartitionLookup {
    /// Resolves a table name to its partition metadata, if registered
    fn lookup(&self, table: &str) -> Option<PartitionMetadata>;
}

/// Thread-safe partition metadata registry
pub struct PartitionRegistry {
    tables: RwLock<HashMap<String, PartitionMetadata>>,
}

impl PartitionRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Validates and registers one table's metadata.
    ///
    /// Registration is all-or-nothing: a rejected declaration leaves the
    /// registry untouched.
    pub fn register(&self, metadata: PartitionMetadata) -> CatalogResult<()> {
        metadata.validate()?;

        let mut tables = self.tables.write().expect("catalog lock poisoned");
        if tables.contains_key(&metadata.table) {
            return Err(CatalogError::duplicate_table(&metadata.table));
        }
        tables.insert(metadata.table.clone(), metadata);
        Ok(())
    }

    /// Removes a table's metadata. Returns true if it was registered.
    pub fn forget(&self, table: &str) -> bool {
        self.tables
            .write()
            .expect("catalog lock poisoned")
            .remove(table)
            .is_some()
    }

    /// Number of registered tables
    pub fn len(&self) -> usize {
        self.tables.read().expect("catalog lock poisoned").len()
    }

    /// Returns true if no table is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PartitionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PartitionLookup for PartitionRegistry {
    fn lookup(&self, table: &str) -> Option<PartitionMetadata> {
        self.tables
            .read()
            .expect("catalog lock poisoned")
            .get(table)
            .cloned()
    }
}
