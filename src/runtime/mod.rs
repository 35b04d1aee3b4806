//! Execution-time support for picky fan-outs
//!
//! Planning only promises that a picky fan-out *can* skip children; this
//! module performs the skip. Given concrete parameter bindings it selects
//! the minimal child subset, and scanning that subset with the bound
//! predicates yields exactly the rows of a full fan-out plus post-filter.

mod selection;

pub use selection::{bind_quals, select_scan_children, ParamBindings};
