//! File I/O for the CLI
//!
//! Catalog and query descriptions are UTF-8 JSON documents on disk;
//! rendered output goes to stdout in one write.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::de::DeserializeOwned;

use super::errors::CliResult;

/// Reads and deserializes one JSON document
pub fn read_json<T: DeserializeOwned>(path: &Path) -> CliResult<T> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Writes rendered output to stdout
pub fn write_output(output: &str) -> CliResult<()> {
    let mut stdout = io::stdout();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
