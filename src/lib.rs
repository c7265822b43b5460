//! Story Graph — branching-narrative seed content for graded-reading apps.
//!
//! Builds the chapter/choice graph for short branching stories (a root
//! chapter, a fan of parallel branches, a shared convergence and ending),
//! with deterministic identifiers, then validates the structural invariants
//! before the graph is handed to a persistence sink.

pub mod core;
pub mod schema;
