//! CLI error boundary
//!
//! Every CLI error is fatal: `main` prints it and exits non-zero. The
//! stable `PRUNE_CLI_*` codes lead each message.

use thiserror::Error;

use crate::catalog::CatalogError;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    /// File could not be read
    #[error("PRUNE_CLI_IO_ERROR: {0}")]
    Io(#[from] std::io::Error),

    /// File held malformed JSON or an unexpected document shape
    #[error("PRUNE_CLI_BAD_JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Catalog file declared invalid partition metadata
    #[error("PRUNE_CLI_CATALOG_REJECTED: {0}")]
    Catalog(#[from] CatalogError),
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
