//! Observable planning events
//!
//! Every event this crate can log, as a typed enum with a stable string
//! form. One log line corresponds to one event.

use std::fmt;

/// Observable events in prunedb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Catalog file loaded and registered
    CatalogLoaded,
    /// Query description loaded
    QueryLoaded,
    /// A base relation was pruned and expanded
    PartitionPrune,
    /// A picky fan-out was registered on a relation
    PickyPathAdded,
    /// Nested-loop candidates with a picky inner side were registered
    JoinRewrite,
    /// Explain output produced
    ExplainComplete,
}

impl Event {
    /// Returns the stable string form of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::CatalogLoaded => "CATALOG_LOADED",
            Event::QueryLoaded => "QUERY_LOADED",
            Event::PartitionPrune => "PARTITION_PRUNE",
            Event::PickyPathAdded => "PICKY_PATH_ADDED",
            Event::JoinRewrite => "JOIN_REWRITE",
            Event::ExplainComplete => "EXPLAIN_COMPLETE",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
