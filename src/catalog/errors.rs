//! Catalog error types
//!
//! Error codes:
//! - PRUNE_CATALOG_NO_CHILDREN (REJECT)
//! - PRUNE_CATALOG_UNORDERED_BOUNDS (REJECT)
//! - PRUNE_CATALOG_OVERLAPPING_BOUNDS (REJECT)
//! - PRUNE_CATALOG_DUPLICATE_CHILD (REJECT)
//! - PRUNE_CATALOG_DUPLICATE_TABLE (REJECT)

use std::fmt;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Severity levels for catalog errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Registration rejected; existing state untouched
    Reject,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Reject => "REJECT",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Catalog-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogErrorCode {
    /// Partitioned table declared with no children
    NoChildren,
    /// Range bounds out of order or not comparable
    UnorderedBounds,
    /// Two range children cover a common value
    OverlappingBounds,
    /// Duplicate child identifier within one table
    DuplicateChild,
    /// Table already registered
    DuplicateTable,
}

impl CatalogErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            CatalogErrorCode::NoChildren => "PRUNE_CATALOG_NO_CHILDREN",
            CatalogErrorCode::UnorderedBounds => "PRUNE_CATALOG_UNORDERED_BOUNDS",
            CatalogErrorCode::OverlappingBounds => "PRUNE_CATALOG_OVERLAPPING_BOUNDS",
            CatalogErrorCode::DuplicateChild => "PRUNE_CATALOG_DUPLICATE_CHILD",
            CatalogErrorCode::DuplicateTable => "PRUNE_CATALOG_DUPLICATE_TABLE",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for CatalogErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Catalog error with full context
#[derive(Debug, Clone)]
pub struct CatalogError {
    code: CatalogErrorCode,
    message: String,
    table: String,
}

impl CatalogError {
    /// Create a no-children error
    pub fn no_children(table: impl Into<String>) -> Self {
        Self {
            code: CatalogErrorCode::NoChildren,
            message: "partitioned table has no children".into(),
            table: table.into(),
        }
    }

    /// Create an unordered-bounds error
    pub fn unordered_bounds(table: impl Into<String>, child: &str) -> Self {
        Self {
            code: CatalogErrorCode::UnorderedBounds,
            message: format!("range bounds around child '{}' are out of order", child),
            table: table.into(),
        }
    }

    /// Create an overlapping-bounds error
    pub fn overlapping_bounds(table: impl Into<String>, child: &str) -> Self {
        Self {
            code: CatalogErrorCode::OverlappingBounds,
            message: format!("child '{}' overlaps its predecessor", child),
            table: table.into(),
        }
    }

    /// Create a duplicate-child error
    pub fn duplicate_child(table: impl Into<String>, child: &str) -> Self {
        Self {
            code: CatalogErrorCode::DuplicateChild,
            message: format!("child '{}' declared twice", child),
            table: table.into(),
        }
    }

    /// Create a duplicate-table error
    pub fn duplicate_table(table: impl Into<String>) -> Self {
        Self {
            code: CatalogErrorCode::DuplicateTable,
            message: "table already registered".into(),
            table: table.into(),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> CatalogErrorCode {
        self.code
    }

    /// Returns the human-readable message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the table the error refers to
    pub fn table(&self) -> &str {
        &self.table
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: table '{}': {}",
            self.code.severity(),
            self.code.code(),
            self.table,
            self.message
        )
    }
}

impl std::error::Error for CatalogError {}
