//! Cycle detection for cycle-guarded relationship subgraphs.
//!
//! # Overview
//!
//! Blocking dependencies form a directed graph. A cycle would make every
//! card in the loop permanently incompletable (each waits on the next), so
//! cycles are rejected at edge-insertion time and the graph is never
//! repaired after the fact. The same check guards parent-child containment
//! when enabled, where a cycle would make a card its own ancestor.
//!
//! # Design
//!
//! - **DFS-based**: inserting `source → target` closes a cycle iff a path
//!   `target → … → source` already exists, so the check is a reachability
//!   search from the target of the proposed edge.
//! - **Reject, don't repair**: the guard runs before the store mutation;
//!   a rejected edge never touches the store.
//! - **Explainable**: rejection carries the full cycle path so the caller
//!   can show *why* the relationship was refused, not just that it was.
//! - **O(V+E)** per check; boards hold tens to low hundreds of cards and
//!   insertion is rare relative to reads, so no incremental structure is
//!   kept.

#![allow(clippy::must_use_candidate, clippy::module_name_repetitions)]

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::ErrorCode;
use crate::model::card::CardRef;
use crate::model::relationship::RelationshipKind;
use crate::store::RelationshipStore;

// ---------------------------------------------------------------------------
// CircularDependencyError
// ---------------------------------------------------------------------------

/// Rejection of an edge that would close a cycle.
///
/// `cycle` is the ordered loop the edge would create: it starts at the
/// source of the proposed edge, follows existing edges of the same kind,
/// and ends back at the source. For a proposed `C → A` over existing
/// `A → B → C`, the path is `[C, A, B, C]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircularDependencyError {
    pub kind: RelationshipKind,
    pub cycle: Vec<CardRef>,
}

impl CircularDependencyError {
    /// Number of distinct cards in the cycle (path length minus the
    /// repeated start card).
    pub fn cycle_len(&self) -> usize {
        self.cycle.len().saturating_sub(1)
    }

    /// Returns `true` if the proposed edge points a card at itself.
    pub fn is_self_loop(&self) -> bool {
        self.cycle_len() == 1
    }

    /// Machine-readable code associated with this error.
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::CycleDetected
    }
}

impl fmt::Display for CircularDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_self_loop() {
            let card = self.cycle.first().map_or("?", CardRef::as_str);
            write!(f, "{} relationship would loop '{card}' onto itself", self.kind)
        } else {
            let path = self
                .cycle
                .iter()
                .map(CardRef::as_str)
                .collect::<Vec<_>>()
                .join(" → ");
            write!(
                f,
                "{} relationship would close a cycle ({} cards): {path}",
                self.kind,
                self.cycle_len()
            )
        }
    }
}

impl std::error::Error for CircularDependencyError {}

// ---------------------------------------------------------------------------
// Admission check
// ---------------------------------------------------------------------------

/// Check whether inserting `source → target` of `kind` preserves
/// acyclicity of that kind's subgraph.
///
/// # Errors
///
/// Returns [`CircularDependencyError`] with the offending cycle path when
/// the edge would close a loop.
pub fn ensure_acyclic(
    store: &RelationshipStore,
    kind: RelationshipKind,
    source: &CardRef,
    target: &CardRef,
) -> Result<(), CircularDependencyError> {
    match would_close_cycle(store, kind, source, target) {
        Some(cycle) => Err(CircularDependencyError { kind, cycle }),
        None => Ok(()),
    }
}

/// Return the cycle path that inserting `source → target` would create,
/// or `None` when the insertion is safe.
///
/// Searches forward from `target` along existing edges of `kind`; if
/// `source` is reachable the new edge closes a loop.
pub fn would_close_cycle(
    store: &RelationshipStore,
    kind: RelationshipKind,
    source: &CardRef,
    target: &CardRef,
) -> Option<Vec<CardRef>> {
    if source == target {
        return Some(vec![source.clone(), source.clone()]);
    }

    // Adjacency over the one kind being checked; other kinds never
    // participate in this subgraph's cycles.
    let mut adjacency: HashMap<&CardRef, Vec<&CardRef>> = HashMap::new();
    for edge in store.edges_of_kind(kind) {
        adjacency.entry(edge.source()).or_default().push(edge.target());
    }

    // Iterative DFS from `target` looking for `source`, recording parents
    // so the path can be reconstructed.
    let mut visited: HashSet<&CardRef> = HashSet::new();
    let mut parents: HashMap<&CardRef, &CardRef> = HashMap::new();
    let mut stack: Vec<&CardRef> = vec![target];
    visited.insert(target);

    let mut found = false;
    while let Some(current) = stack.pop() {
        if current == source {
            found = true;
            break;
        }
        let Some(next) = adjacency.get(current) else {
            continue;
        };
        for &neighbor in next {
            if visited.insert(neighbor) {
                parents.insert(neighbor, current);
                stack.push(neighbor);
            }
        }
    }

    if !found {
        return None;
    }

    // Walk parents back from `source` to `target`, then lay the path out
    // as source → target → … → source.
    let mut chain = vec![source.clone()];
    let mut current = source;
    while current != target {
        match parents.get(current) {
            Some(&parent) => {
                chain.push(parent.clone());
                current = parent;
            }
            None => break,
        }
    }
    chain.reverse();

    let mut cycle = vec![source.clone()];
    cycle.extend(chain);
    Some(cycle)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::card::ActorId;
    use crate::model::relationship::{EdgeKey, RelationshipEdge};

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn store_with(edges: &[(&str, &str)]) -> RelationshipStore {
        store_with_kind(edges, RelationshipKind::Blocks)
    }

    fn store_with_kind(edges: &[(&str, &str)], kind: RelationshipKind) -> RelationshipStore {
        let mut store = RelationshipStore::new();
        for (source, target) in edges {
            store
                .add_edge(RelationshipEdge::new(
                    EdgeKey::new(CardRef::from(*source), CardRef::from(*target), kind),
                    None,
                    ActorId::from("alice"),
                ))
                .expect("test edge");
        }
        store
    }

    fn check(store: &RelationshipStore, source: &str, target: &str) -> Option<Vec<String>> {
        would_close_cycle(
            store,
            RelationshipKind::Blocks,
            &CardRef::from(source),
            &CardRef::from(target),
        )
        .map(|cycle| cycle.iter().map(|c| c.as_str().to_string()).collect())
    }

    // -----------------------------------------------------------------------
    // Safe insertions
    // -----------------------------------------------------------------------

    #[test]
    fn empty_graph_admits_any_edge() {
        let store = RelationshipStore::new();
        assert_eq!(check(&store, "a", "b"), None);
    }

    #[test]
    fn chain_extension_is_safe() {
        let store = store_with(&[("a", "b"), ("b", "c")]);
        assert_eq!(check(&store, "d", "a"), None);
        assert_eq!(check(&store, "c", "d"), None);
    }

    #[test]
    fn diamond_is_safe() {
        let store = store_with(&[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")]);
        assert_eq!(check(&store, "e", "a"), None);
    }

    #[test]
    fn parallel_chains_can_be_joined() {
        let store = store_with(&[("a", "b"), ("c", "d")]);
        assert_eq!(check(&store, "a", "c"), None);
    }

    // -----------------------------------------------------------------------
    // Rejections
    // -----------------------------------------------------------------------

    #[test]
    fn self_loop_rejected() {
        let store = RelationshipStore::new();
        let cycle = check(&store, "a", "a").expect("self-loop detected");
        assert_eq!(cycle, vec!["a", "a"]);
    }

    #[test]
    fn mutual_block_rejected() {
        let store = store_with(&[("a", "b")]);
        let cycle = check(&store, "b", "a").expect("mutual block detected");
        assert_eq!(cycle, vec!["b", "a", "b"]);
    }

    #[test]
    fn three_card_cycle_reports_full_path() {
        let store = store_with(&[("a", "b"), ("b", "c")]);
        let cycle = check(&store, "c", "a").expect("cycle detected");
        assert_eq!(cycle, vec!["c", "a", "b", "c"]);
    }

    #[test]
    fn long_chain_cycle_detected() {
        let names: Vec<String> = (0..30).map(|i| format!("card-{i:02}")).collect();
        let edges: Vec<(&str, &str)> = names
            .windows(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
            .collect();
        let store = store_with(&edges);

        let cycle = check(&store, &names[29], &names[0]).expect("cycle detected");
        assert_eq!(cycle.len(), 31, "closing edge loops through every card");
        assert_eq!(cycle.first().map(String::as_str), Some("card-29"));
        assert_eq!(cycle.last().map(String::as_str), Some("card-29"));
    }

    #[test]
    fn cycle_in_disconnected_component_detected() {
        let store = store_with(&[("x", "y"), ("y", "z"), ("a", "b")]);
        let cycle = check(&store, "b", "a").expect("cycle in a-b component");
        assert_eq!(cycle, vec!["b", "a", "b"]);
    }

    // -----------------------------------------------------------------------
    // Kind isolation
    // -----------------------------------------------------------------------

    #[test]
    fn other_kinds_do_not_close_blocks_cycles() {
        // a relates_to b must not make b -[blocks]-> a a cycle.
        let store = store_with_kind(&[("a", "b")], RelationshipKind::RelatesTo);
        assert_eq!(check(&store, "b", "a"), None);
    }

    #[test]
    fn parent_child_cycles_detected_within_their_own_kind() {
        let store = store_with_kind(&[("root", "mid"), ("mid", "leaf")], RelationshipKind::ParentChild);
        let cycle = would_close_cycle(
            &store,
            RelationshipKind::ParentChild,
            &CardRef::from("leaf"),
            &CardRef::from("root"),
        )
        .expect("card would become its own ancestor");
        assert_eq!(cycle.len(), 4);
    }

    // -----------------------------------------------------------------------
    // ensure_acyclic / error rendering
    // -----------------------------------------------------------------------

    #[test]
    fn ensure_acyclic_passes_through_safe_edges() {
        let store = store_with(&[("a", "b")]);
        assert!(
            ensure_acyclic(
                &store,
                RelationshipKind::Blocks,
                &CardRef::from("b"),
                &CardRef::from("c"),
            )
            .is_ok()
        );
    }

    #[test]
    fn error_display_shows_arrow_path() {
        let store = store_with(&[("a", "b"), ("b", "c")]);
        let err = ensure_acyclic(
            &store,
            RelationshipKind::Blocks,
            &CardRef::from("c"),
            &CardRef::from("a"),
        )
        .unwrap_err();

        assert_eq!(err.cycle_len(), 3);
        assert_eq!(err.code(), ErrorCode::CycleDetected);
        let display = err.to_string();
        assert!(display.contains("c → a → b → c"), "display: {display}");
        assert!(display.contains("3 cards"), "display: {display}");
    }

    #[test]
    fn self_loop_display_names_the_card() {
        let err = ensure_acyclic(
            &RelationshipStore::new(),
            RelationshipKind::Blocks,
            &CardRef::from("a"),
            &CardRef::from("a"),
        )
        .unwrap_err();
        assert!(err.is_self_loop());
        let display = err.to_string();
        assert!(display.contains("onto itself"), "display: {display}");
        assert!(display.contains('a'), "display: {display}");
    }

    // -----------------------------------------------------------------------
    // Large graphs stay fast (O(V+E) sanity)
    // -----------------------------------------------------------------------

    #[test]
    fn thousand_card_chain_safe_and_cyclic_cases() {
        let names: Vec<String> = (0..1000).map(|i| format!("card-{i:04}")).collect();
        let edges: Vec<(&str, &str)> = names
            .windows(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
            .collect();
        let store = store_with(&edges);

        assert_eq!(check(&store, "fresh", &names[0]), None);
        let cycle = check(&store, &names[999], &names[0]).expect("giant cycle detected");
        assert_eq!(cycle.len(), 1001);
    }
}
