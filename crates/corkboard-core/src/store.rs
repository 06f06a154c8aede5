//! Authoritative relationship storage for one board.
//!
//! # Overview
//!
//! The store is a dumb ledger of [`RelationshipEdge`]s keyed by their
//! `(source, target, kind)` identity. It enforces uniqueness and nothing
//! else; business rules (acyclicity, card existence, limits) are checked by
//! the callers that own the mutation path, before `add_edge`.
//!
//! # Determinism
//!
//! Edges live in a `BTreeMap` so iteration order is stable, and
//! [`RelationshipStore::fingerprint`] hashes the sorted edge list. Derived
//! views key their caches on the fingerprint: it changes exactly when the
//! edge set changes.

#![allow(clippy::must_use_candidate, clippy::module_name_repetitions)]

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use tracing::debug;

use crate::error::ErrorCode;
use crate::model::card::CardRef;
use crate::model::relationship::{EdgeKey, RelationshipEdge, RelationshipKind};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors returned by store mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// An identical `(source, target, kind)` edge already exists.
    #[error("relationship already exists: {0}")]
    DuplicateEdge(EdgeKey),
}

impl StoreError {
    /// Machine-readable code associated with this error.
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::DuplicateEdge(_) => ErrorCode::DuplicateEdge,
        }
    }
}

// ---------------------------------------------------------------------------
// RelationshipStore
// ---------------------------------------------------------------------------

/// All relationship edges of one board.
#[derive(Debug, Clone, Default)]
pub struct RelationshipStore {
    edges: BTreeMap<EdgeKey, RelationshipEdge>,
}

impl RelationshipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new edge.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateEdge`] if an edge with the same
    /// `(source, target, kind)` already exists; the store is unchanged.
    pub fn add_edge(&mut self, edge: RelationshipEdge) -> Result<&RelationshipEdge, StoreError> {
        match self.edges.entry(edge.key.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateEdge(edge.key)),
            Entry::Vacant(slot) => {
                debug!(edge = %edge.key, "edge added");
                Ok(slot.insert(edge))
            }
        }
    }

    /// Remove an edge. Idempotent: removing an absent edge returns `None`
    /// and leaves the store unchanged.
    pub fn remove_edge(&mut self, key: &EdgeKey) -> Option<RelationshipEdge> {
        let removed = self.edges.remove(key);
        if removed.is_some() {
            debug!(edge = %key, "edge removed");
        }
        removed
    }

    /// Returns `true` if an edge with this exact key exists.
    pub fn contains(&self, key: &EdgeKey) -> bool {
        self.edges.contains_key(key)
    }

    /// All edges where the card is the source or the target, in key order.
    pub fn edges_for<'a>(&'a self, card: &'a CardRef) -> impl Iterator<Item = &'a RelationshipEdge> {
        self.edges
            .values()
            .filter(move |e| e.source() == card || e.target() == card)
    }

    /// All edges of one kind, in key order.
    pub fn edges_of_kind(&self, kind: RelationshipKind) -> impl Iterator<Item = &RelationshipEdge> {
        self.edges.values().filter(move |e| e.kind() == kind)
    }

    /// All edges, in key order.
    pub fn iter(&self) -> impl Iterator<Item = &RelationshipEdge> {
        self.edges.values()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// BLAKE3 content hash of the sorted edge list, for cache invalidation.
    ///
    /// Only edge identities participate: descriptions and timestamps do not
    /// affect any derived view, so they do not affect the fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for key in self.edges.keys() {
            hasher.update(key.source.as_str().as_bytes());
            hasher.update(b"\x00");
            hasher.update(key.target.as_str().as_bytes());
            hasher.update(b"\x00");
            hasher.update(key.kind.as_str().as_bytes());
            hasher.update(b"\x00");
        }
        format!("blake3:{}", hasher.finalize())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
