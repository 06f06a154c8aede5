//! Fingerprint-tagged memoization of derived views.
//!
//! # Overview
//!
//! Derived views are pure functions of board state, so they can be cached
//! until the state changes. Two invalidation signals cooperate:
//!
//! - The edge-set **fingerprint** carried by [`BlocksGraph`]: a mismatch
//!   means the relationship graph changed and every cached view is stale.
//! - Explicit [`AnalyzerCache::invalidate`], called by the board engine
//!   after *any* successful mutation. Card commits can move a card into a
//!   terminal column without touching an edge, which changes the blocked
//!   set but not the fingerprint, so the engine's call is load-bearing and
//!   not merely an optimization hint.

use std::collections::BTreeSet;

use tracing::debug;

use corkboard_core::model::card::CardRef;

use crate::graph::blocked::blocked_cards;
use crate::graph::build::BlocksGraph;
use crate::graph::critical_path::{CriticalPathResult, compute_critical_path};

/// Memoized derived views for one board.
#[derive(Debug, Default)]
pub struct AnalyzerCache {
    fingerprint: Option<String>,
    critical_path: Option<CriticalPathResult>,
    blocked: Option<BTreeSet<CardRef>>,
}

impl AnalyzerCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every cached view. Called after each successful mutation.
    pub fn invalidate(&mut self) {
        self.fingerprint = None;
        self.critical_path = None;
        self.blocked = None;
    }

    /// The critical path for `bg`, computed at most once per fingerprint.
    pub fn critical_path(&mut self, bg: &BlocksGraph) -> CriticalPathResult {
        self.refresh(bg);
        self.critical_path
            .get_or_insert_with(|| compute_critical_path(bg))
            .clone()
    }

    /// The blocked-card set for `bg`, computed at most once per
    /// invalidation window.
    ///
    /// The terminal predicate is sampled only on a cache miss; callers
    /// must invalidate whenever column state changes.
    pub fn blocked_cards<F>(&mut self, bg: &BlocksGraph, is_terminal: F) -> BTreeSet<CardRef>
    where
        F: Fn(&CardRef) -> bool,
    {
        self.refresh(bg);
        self.blocked
            .get_or_insert_with(|| blocked_cards(bg, is_terminal))
            .clone()
    }

    fn refresh(&mut self, bg: &BlocksGraph) {
        if self.fingerprint.as_deref() == Some(bg.fingerprint.as_str()) {
            return;
        }
        if self.fingerprint.is_some() {
            debug!("analyzer cache fingerprint mismatch, recomputing");
        }
        self.critical_path = None;
        self.blocked = None;
        self.fingerprint = Some(bg.fingerprint.clone());
    }
}
