//! corkboard-analytics library.
//!
//! Derived, read-only views over a board's `blocks` dependency graph.
//! Everything here is a pure function of an edge snapshot; the only state
//! is [`cache::AnalyzerCache`], which memoizes results per edge-set
//! fingerprint and is cleared by the board engine after every successful
//! mutation.

pub mod cache;
pub mod graph;

pub use cache::AnalyzerCache;
pub use graph::build::BlocksGraph;
pub use graph::critical_path::CriticalPathResult;
