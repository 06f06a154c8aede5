//! Graph construction from a board's relationship store.
//!
//! # Overview
//!
//! Materializes the `blocks` subgraph as a [`petgraph`] directed graph for
//! the derived-view computations (critical path, closures, blocked set).
//!
//! ## Edge Direction
//!
//! An edge `A → B` means "A cannot be considered complete until B is":
//! A depends on B. Sources of edges are the waiting cards; sinks are the
//! cards everything else waits through.
//!
//! ## Nodes
//!
//! Only cards touching at least one `blocks` edge appear. Cards without
//! dependencies have no derived properties, so there is nothing to
//! compute for them.
//!
//! ## Cache Invalidation
//!
//! The graph carries the store's edge-set fingerprint. Derived views are
//! memoized per fingerprint; see [`crate::cache::AnalyzerCache`].

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use tracing::instrument;

use corkboard_core::model::card::CardRef;
use corkboard_core::model::relationship::RelationshipKind;
use corkboard_core::store::RelationshipStore;

// ---------------------------------------------------------------------------
// BlocksGraph
// ---------------------------------------------------------------------------

/// The `blocks` dependency graph of one board.
///
/// Immutable once built; rebuild from the store after a mutation. The
/// guard keeps the subgraph acyclic, so consumers may assume a DAG.
#[derive(Debug, Clone)]
pub struct BlocksGraph {
    /// Directed graph: nodes are cards, an edge `A → B` means A waits on B.
    pub graph: DiGraph<CardRef, ()>,
    /// Mapping from card to petgraph `NodeIndex`.
    pub node_map: HashMap<CardRef, NodeIndex>,
    /// The store fingerprint this graph was built from.
    pub fingerprint: String,
}

impl BlocksGraph {
    /// Build the blocks graph from the board's relationship store.
    ///
    /// # Complexity
    ///
    /// O(E) over the store's blocks edges.
    #[must_use]
    #[instrument(skip(store))]
    pub fn from_store(store: &RelationshipStore) -> Self {
        let mut graph = DiGraph::<CardRef, ()>::new();
        let mut node_map: HashMap<CardRef, NodeIndex> = HashMap::new();

        for edge in store.edges_of_kind(RelationshipKind::Blocks) {
            let source = *node_map
                .entry(edge.source().clone())
                .or_insert_with(|| graph.add_node(edge.source().clone()));
            let target = *node_map
                .entry(edge.target().clone())
                .or_insert_with(|| graph.add_node(edge.target().clone()));
            // Keys are unique per (source, target, kind), so no duplicate
            // edges can arrive from the store.
            graph.add_edge(source, target, ());
        }

        Self {
            graph,
            node_map,
            fingerprint: store.fingerprint(),
        }
    }

    /// Number of cards in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of blocks edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up the `NodeIndex` for a card.
    #[must_use]
    pub fn node_index(&self, card: &CardRef) -> Option<NodeIndex> {
        self.node_map.get(card).copied()
    }

    /// The card at a node.
    #[must_use]
    pub fn card(&self, idx: NodeIndex) -> Option<&CardRef> {
        self.graph.node_weight(idx)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
