//! Dependency closures for highlighting.
//!
//! When a user hovers a card, the UI highlights everything the card waits
//! on and everything waiting on it. Direct neighbours answer "what did I
//! just link", transitive closures answer "what does this chain really
//! touch".

use std::collections::{BTreeSet, VecDeque};

use petgraph::{Direction, graph::NodeIndex};

use corkboard_core::model::card::CardRef;

use crate::graph::build::BlocksGraph;

/// Cards the given card directly waits on.
#[must_use]
pub fn direct_dependencies_of(bg: &BlocksGraph, card: &CardRef) -> BTreeSet<CardRef> {
    direct(bg, card, Direction::Outgoing)
}

/// Cards that directly wait on the given card.
#[must_use]
pub fn direct_dependents_of(bg: &BlocksGraph, card: &CardRef) -> BTreeSet<CardRef> {
    direct(bg, card, Direction::Incoming)
}

/// Every card the given card waits on, directly or through a chain.
#[must_use]
pub fn dependencies_of(bg: &BlocksGraph, card: &CardRef) -> BTreeSet<CardRef> {
    closure(bg, card, Direction::Outgoing)
}

/// Every card waiting on the given card, directly or through a chain.
#[must_use]
pub fn dependents_of(bg: &BlocksGraph, card: &CardRef) -> BTreeSet<CardRef> {
    closure(bg, card, Direction::Incoming)
}

fn direct(bg: &BlocksGraph, card: &CardRef, direction: Direction) -> BTreeSet<CardRef> {
    let Some(start) = bg.node_index(card) else {
        return BTreeSet::new();
    };
    bg.graph
        .neighbors_directed(start, direction)
        .filter_map(|idx| bg.card(idx).cloned())
        .collect()
}

/// BFS closure from `card`, excluding the card itself.
fn closure(bg: &BlocksGraph, card: &CardRef, direction: Direction) -> BTreeSet<CardRef> {
    let Some(start) = bg.node_index(card) else {
        return BTreeSet::new();
    };

    let mut seen: BTreeSet<NodeIndex> = BTreeSet::new();
    let mut queue: VecDeque<NodeIndex> = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        for next in bg.graph.neighbors_directed(current, direction) {
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }

    seen.remove(&start);
    seen.into_iter()
        .filter_map(|idx| bg.card(idx).cloned())
        .collect()
}
