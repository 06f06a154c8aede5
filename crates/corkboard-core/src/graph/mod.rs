//! Graph-level rules for card relationships.
//!
//! ## Submodules
//!
//! - [`cycles`] — the admission check that keeps cycle-guarded relationship
//!   subgraphs acyclic.

pub mod cycles;
