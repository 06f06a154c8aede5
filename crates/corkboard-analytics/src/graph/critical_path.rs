//! Critical path analysis for the dependency graph.
//!
//! # Overview
//!
//! The critical path is the longest chain of `blocks` dependencies on the
//! board. It determines the minimum number of completion steps the board
//! needs: every card on the path must finish in sequence, so the chain's
//! length is a lower bound on delivery.
//!
//! # Algorithm
//!
//! The blocks graph is a DAG by construction (the admission guard rejects
//! cycles), so a single pass in topological order suffices:
//!
//! 1. For every card, relax the longest distance over its predecessors.
//! 2. Alongside the distance, carry the lexicographically smallest path of
//!    that length ending at the card. Carrying the path (rather than one
//!    back-pointer) is what makes ties deterministic end to end: the
//!    smallest *sequence* wins, not the smallest final hop.
//! 3. The result is the smallest path among those with maximal length.
//!
//! Per-card topological depth falls out of the same pass: depth is the
//! longest distance from any chain head, 0-based.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;

use petgraph::{Direction, algo::toposort, graph::NodeIndex, visit::EdgeRef};

use corkboard_core::model::card::CardRef;

use crate::graph::build::BlocksGraph;

// ---------------------------------------------------------------------------
// CriticalPathResult
// ---------------------------------------------------------------------------

/// Result of critical path analysis on a board's dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriticalPathResult {
    /// Cards on the critical path, in dependency order: each card waits on
    /// the next, ending at a card that waits on nothing.
    pub path: Vec<CardRef>,
    /// Number of cards on the path.
    pub length: usize,
    /// Longest chain of blocks edges leading into each card, 0-based.
    /// Cards at depth 0 head their chains.
    pub depths: HashMap<CardRef, usize>,
}

impl CriticalPathResult {
    /// The empty result for a board with no blocks edges.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            path: Vec::new(),
            length: 0,
            depths: HashMap::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Topological depth of one card, if it participates in any dependency.
    #[must_use]
    pub fn depth(&self, card: &CardRef) -> Option<usize> {
        self.depths.get(card).copied()
    }
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Compute the critical path of the blocks graph.
///
/// Ties between equally long chains are broken by the lexicographically
/// smallest card sequence, so repeated computations over the same edge set
/// always agree.
#[must_use]
pub fn compute_critical_path(bg: &BlocksGraph) -> CriticalPathResult {
    if bg.graph.node_count() == 0 {
        return CriticalPathResult::empty();
    }

    // The guard keeps the graph acyclic; the fallback only matters if a
    // caller hand-builds a graph that bypassed admission.
    let topo: Vec<NodeIndex> =
        toposort(&bg.graph, None).unwrap_or_else(|_| bg.graph.node_indices().collect());

    let mut dist: HashMap<NodeIndex, usize> = HashMap::with_capacity(topo.len());
    let mut best_path: HashMap<NodeIndex, Vec<CardRef>> = HashMap::with_capacity(topo.len());

    for &v in &topo {
        let preds: Vec<NodeIndex> = bg
            .graph
            .edges_directed(v, Direction::Incoming)
            .map(|e| e.source())
            .collect();

        let d = preds
            .iter()
            .map(|p| dist.get(p).copied().unwrap_or(0))
            .max()
            .map_or(1, |longest| longest + 1);

        let card = bg.graph[v].clone();
        let mut best: Option<Vec<CardRef>> = None;
        for p in &preds {
            if dist.get(p).copied().unwrap_or(0) + 1 != d {
                continue;
            }
            let Some(prefix) = best_path.get(p) else {
                continue;
            };
            let mut candidate = prefix.clone();
            candidate.push(card.clone());
            if best.as_ref().is_none_or(|b| candidate < *b) {
                best = Some(candidate);
            }
        }

        dist.insert(v, d);
        best_path.insert(v, best.unwrap_or_else(|| vec![card]));
    }

    let longest = dist.values().copied().max().unwrap_or(0);
    let path = topo
        .iter()
        .filter(|v| dist.get(*v).copied().unwrap_or(0) == longest)
        .filter_map(|v| best_path.get(v))
        .min()
        .cloned()
        .unwrap_or_default();

    let depths = dist
        .iter()
        .filter_map(|(idx, d)| bg.card(*idx).map(|card| (card.clone(), d - 1)))
        .collect();

    CriticalPathResult {
        length: path.len(),
        path,
        depths,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
