//! corkboard-core library.
//!
//! Authoritative state for one board: typed card relationships, the
//! acyclicity guard for dependency edges, the per-card version ledger, and
//! the conflict resolver that arbitrates concurrent edits.
//!
//! # Conventions
//!
//! - **Errors**: component error enums derive `thiserror::Error` and map to
//!   a stable [`error::ErrorCode`]. Expected outcomes (version conflicts,
//!   cycle rejections) are typed results, not panics.
//! - **Logging**: use `tracing` macros (`info!`, `warn!`, `error!`,
//!   `debug!`, `trace!`).

pub mod config;
pub mod conflict;
pub mod error;
pub mod event;
pub mod graph;
pub mod model;
pub mod store;
pub mod version;
