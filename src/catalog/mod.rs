//! Partition catalog subsystem for prunedb
//!
//! Holds the partitioning declarations the rewriters consult: which tables
//! are partitioned, by which column, under which strategy, and into which
//! ordered children.
//!
//! # Invariants
//!
//! - Child order is stable for the lifetime of a registration; index `i`
//!   always denotes the same child
//! - Range children are ordered ascending and never overlap
//! - Registration validates; lookup never fails (absence is `None`)
//! - The registry is read-mostly: concurrent lookups are safe, refresh is
//!   serialized by the registry's own lock

mod errors;
mod metadata;
mod registry;

pub use errors::{CatalogError, CatalogErrorCode, CatalogResult, Severity};
pub use metadata::{ChildPartition, PartitionMetadata, PartitionStrategy};
pub use registry::{PartitionLookup, PartitionRegistry};
