//! Graph construction and derived views.
//!
//! ## Submodules
//!
//! - [`build`] — materialize a petgraph `DiGraph` from a board's blocks
//!   edges.
//! - [`critical_path`] — longest dependency chain and per-card depth.
//! - [`blocked`] — the set of cards waiting on unfinished work.
//! - [`reachability`] — direct and transitive dependency closures.

pub mod blocked;
pub mod build;
pub mod critical_path;
pub mod reachability;
