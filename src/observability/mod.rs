//! Observability for prunedb
//!
//! Structured JSON logs with deterministic key ordering, plus the typed
//! events the planner emits. Logging is synchronous and read-only: it
//! never changes a planning decision and never runs in the background.

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};
