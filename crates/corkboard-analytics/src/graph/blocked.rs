//! The blocked-card set.
//!
//! A card is blocked while it waits on at least one dependency that has
//! not reached a terminal column. The UI warns before moving a blocked
//! card into active work, so this view is recomputed on demand rather
//! than stored.

use std::collections::BTreeSet;

use petgraph::visit::EdgeRef;

use corkboard_core::model::card::CardRef;

use crate::graph::build::BlocksGraph;

/// Cards that are the source of at least one outstanding blocks edge.
///
/// `is_terminal` reports whether a card's work is finished (its column is
/// terminal). Dependencies the predicate does not know about are treated
/// as unfinished: an edge pointing at an untracked card still blocks.
///
/// The result is ordered so repeated computations render identically.
#[must_use]
pub fn blocked_cards<F>(bg: &BlocksGraph, is_terminal: F) -> BTreeSet<CardRef>
where
    F: Fn(&CardRef) -> bool,
{
    bg.graph
        .edge_references()
        .filter_map(|edge| {
            let target = bg.graph.node_weight(edge.target())?;
            if is_terminal(target) {
                return None;
            }
            bg.graph.node_weight(edge.source()).cloned()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use corkboard_core::model::card::ActorId;
    use corkboard_core::model::relationship::{EdgeKey, RelationshipEdge, RelationshipKind};
    use corkboard_core::store::RelationshipStore;

    fn graph_of(edges: &[(&str, &str)]) -> BlocksGraph {
        let mut store = RelationshipStore::new();
        for (source, target) in edges {
            store
                .add_edge(RelationshipEdge::new(
                    EdgeKey::new(
                        CardRef::from(*source),
                        CardRef::from(*target),
                        RelationshipKind::Blocks,
                    ),
                    None,
                    ActorId::from("alice"),
                ))
                .expect("test edge");
        }
        BlocksGraph::from_store(&store)
    }

    fn refs(names: &[&str]) -> BTreeSet<CardRef> {
        names.iter().map(|n| CardRef::from(*n)).collect()
    }

    #[test]
    fn empty_graph_has_no_blocked_cards() {
        let blocked = blocked_cards(&graph_of(&[]), |_| false);
        assert!(blocked.is_empty());
    }

    #[test]
    fn sources_of_outstanding_edges_are_blocked() {
        // a waits on b, b waits on c; nothing is finished.
        let blocked = blocked_cards(&graph_of(&[("a", "b"), ("b", "c")]), |_| false);
        assert_eq!(blocked, refs(&["a", "b"]));
    }

    #[test]
    fn finished_dependency_stops_blocking() {
        let done = CardRef::from("b");
        let blocked = blocked_cards(&graph_of(&[("a", "b"), ("b", "c")]), |card| *card == done);

        // a's only dependency is finished; b still waits on c.
        assert_eq!(blocked, refs(&["b"]));
    }

    #[test]
    fn one_unfinished_dependency_is_enough() {
        let done = CardRef::from("b");
        let blocked =
            blocked_cards(&graph_of(&[("a", "b"), ("a", "c")]), |card| *card == done);
        assert_eq!(blocked, refs(&["a"]), "c is still outstanding");
    }

    #[test]
    fn unknown_dependencies_still_block() {
        // The predicate knows nothing about c (e.g. the card was archived
        // out of the ledger); the edge still blocks.
        let blocked = blocked_cards(&graph_of(&[("a", "c")]), |_| false);
        assert_eq!(blocked, refs(&["a"]));
    }
}
