//! Known-topology regression tests for the derived graph views.
//!
//! Each test uses a hand-crafted board with known properties. Expected
//! values are computed analytically and hardcoded, so any algorithm change
//! that shifts a result is caught here.

use std::collections::BTreeSet;

use corkboard_analytics::cache::AnalyzerCache;
use corkboard_analytics::graph::blocked::blocked_cards;
use corkboard_analytics::graph::build::BlocksGraph;
use corkboard_analytics::graph::critical_path::compute_critical_path;
use corkboard_analytics::graph::reachability::{dependencies_of, dependents_of};
use corkboard_core::model::card::{ActorId, CardRef};
use corkboard_core::model::relationship::{EdgeKey, RelationshipEdge, RelationshipKind};
use corkboard_core::store::RelationshipStore;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn board(edges: &[(&str, &str)]) -> (RelationshipStore, BlocksGraph) {
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
            .expect("edge");
    }
    let graph = BlocksGraph::from_store(&store);
    (store, graph)
}

fn refs(names: &[&str]) -> BTreeSet<CardRef> {
    names.iter().map(|n| CardRef::from(*n)).collect()
}

fn path_names(path: &[CardRef]) -> Vec<&str> {
    path.iter().map(CardRef::as_str).collect()
}

// ---------------------------------------------------------------------------
// Release-train topology: chain with a side branch
// ---------------------------------------------------------------------------

#[test]
fn release_train_critical_path_and_blocked_set() {
    // release waits on backend, backend waits on schema; release also
    // waits on docs.
    let (_, graph) = board(&[
        ("release", "backend"),
        ("backend", "schema"),
        ("release", "docs"),
    ]);

    let result = compute_critical_path(&graph);
    assert_eq!(path_names(&result.path), vec!["release", "backend", "schema"]);
    assert_eq!(result.length, 3);

    // Nothing finished: every card with a dependency is blocked.
    let blocked = blocked_cards(&graph, |_| false);
    assert_eq!(blocked, refs(&["release", "backend"]));

    // schema lands; backend is free, release still waits on backend + docs.
    let schema = CardRef::from("schema");
    let blocked = blocked_cards(&graph, |c| *c == schema);
    assert_eq!(blocked, refs(&["release"]));
}

#[test]
fn release_train_closures() {
    let (_, graph) = board(&[
        ("release", "backend"),
        ("backend", "schema"),
        ("release", "docs"),
    ]);

    let release = CardRef::from("release");
    assert_eq!(
        dependencies_of(&graph, &release),
        refs(&["backend", "schema", "docs"])
    );

    let schema = CardRef::from("schema");
    assert_eq!(dependents_of(&graph, &schema), refs(&["backend", "release"]));
}

// ---------------------------------------------------------------------------
// Diamond with a tail
// ---------------------------------------------------------------------------

#[test]
fn diamond_with_tail_depths() {
    // top waits on left and right, both wait on base, base waits on tail.
    let (_, graph) = board(&[
        ("top", "left"),
        ("top", "right"),
        ("left", "base"),
        ("right", "base"),
        ("base", "tail"),
    ]);

    let result = compute_critical_path(&graph);
    assert_eq!(result.length, 4);
    assert_eq!(result.depth(&CardRef::from("top")), Some(0));
    assert_eq!(result.depth(&CardRef::from("left")), Some(1));
    assert_eq!(result.depth(&CardRef::from("right")), Some(1));
    assert_eq!(result.depth(&CardRef::from("base")), Some(2));
    assert_eq!(result.depth(&CardRef::from("tail")), Some(3));

    // Path is deterministic: left < right at the tie.
    assert_eq!(
        path_names(&result.path),
        vec!["top", "left", "base", "tail"]
    );
}

// ---------------------------------------------------------------------------
// Non-blocking kinds stay invisible
// ---------------------------------------------------------------------------

#[test]
fn non_blocking_kinds_do_not_shape_the_views() {
    let mut store = RelationshipStore::new();
    for (source, target, kind) in [
        ("a", "b", RelationshipKind::Blocks),
        ("b", "c", RelationshipKind::RelatesTo),
        ("c", "d", RelationshipKind::Duplicate),
        ("d", "e", RelationshipKind::ParentChild),
    ] {
        store
            .add_edge(RelationshipEdge::new(
                EdgeKey::new(CardRef::from(source), CardRef::from(target), kind),
                None,
                ActorId::from("alice"),
            ))
            .expect("edge");
    }

    let graph = BlocksGraph::from_store(&store);
    assert_eq!(graph.edge_count(), 1);

    let result = compute_critical_path(&graph);
    assert_eq!(path_names(&result.path), vec!["a", "b"]);

    let blocked = blocked_cards(&graph, |_| false);
    assert_eq!(blocked, refs(&["a"]));
}

// ---------------------------------------------------------------------------
// Cache behavior across store mutations
// ---------------------------------------------------------------------------

#[test]
fn cache_follows_store_mutations() {
    let (mut store, graph) = board(&[("a", "b")]);
    let mut cache = AnalyzerCache::new();

    assert_eq!(cache.critical_path(&graph).length, 2);

    store
        .add_edge(RelationshipEdge::new(
            EdgeKey::new(
                CardRef::from("b"),
                CardRef::from("c"),
                RelationshipKind::Blocks,
            ),
            None,
            ActorId::from("alice"),
        ))
        .expect("edge");

    let rebuilt = BlocksGraph::from_store(&store);
    assert_eq!(cache.critical_path(&rebuilt).length, 3);

    store.remove_edge(&EdgeKey::new(
        CardRef::from("b"),
        CardRef::from("c"),
        RelationshipKind::Blocks,
    ));
    let rebuilt = BlocksGraph::from_store(&store);
    assert_eq!(cache.critical_path(&rebuilt).length, 2);
}
