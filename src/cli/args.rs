//! CLI argument definitions using clap
//!
//! Commands:
//! - prunedb explain --catalog <path> --query <path>
//! - prunedb plan --catalog <path> --query <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// prunedb - partition pruning and join-aware plan rewriting
#[derive(Parser, Debug)]
#[command(name = "prunedb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print every candidate path the rewriters produce for a query
    Explain {
        /// Path to the partition catalog file
        #[arg(long, default_value = "./catalog.json")]
        catalog: PathBuf,
        /// Path to the query description file
        #[arg(long)]
        query: PathBuf,
    },

    /// Print the cheapest surviving plan for a query
    Plan {
        /// Path to the partition catalog file
        #[arg(long, default_value = "./catalog.json")]
        catalog: PathBuf,
        /// Path to the query description file
        #[arg(long)]
        query: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
