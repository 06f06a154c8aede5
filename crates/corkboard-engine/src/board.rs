//! The per-board facade.
//!
//! # Overview
//!
//! One [`Board`] owns everything mutable for a single kanban board: the
//! relationship store, the version ledger, and the conflict resolver, all
//! behind a read-write lock. Mutations (edges, commits, resolutions) take
//! the write lock; derived reads take the read lock and share a memoized
//! analyzer cache. Readers observe either the pre- or post-mutation state,
//! never a torn edge set.
//!
//! # Locking
//!
//! Two locks, always acquired in the same order (state, then cache):
//!
//! - `RwLock<BoardState>` - the authoritative state. The exclusive write
//!   guard is what makes the ledger's check-and-increment atomic and lets
//!   the resolver promise that `KeepLocal` resolutions land.
//! - `Mutex<AnalyzerCache>` - memoized derived views, held briefly inside
//!   reads. Invalidated after every successful mutation, including card
//!   commits: a column change shifts the blocked set without touching the
//!   edge fingerprint.
//!
//! # Events
//!
//! Every accepted mutation publishes exactly one domain event, after the
//! state change and outside the write lock. Rejected or conflicted
//! operations publish nothing.

#![allow(clippy::must_use_candidate, clippy::module_name_repetitions)]

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use corkboard_analytics::cache::AnalyzerCache;
use corkboard_analytics::graph::build::BlocksGraph;
use corkboard_analytics::graph::critical_path::CriticalPathResult;
use corkboard_analytics::graph::reachability;
use corkboard_core::config::BoardConfig;
use corkboard_core::conflict::{
    ConflictCase, ConflictError, ConflictId, ConflictResolver, Resolution, ResolutionOutcome,
    SubmitOutcome,
};
use corkboard_core::error::ErrorCode;
use corkboard_core::event::{DomainEvent, EventSink};
use corkboard_core::graph::cycles::{CircularDependencyError, ensure_acyclic};
use corkboard_core::model::card::{CardPatch, CardRef, CardSnapshot};
use corkboard_core::model::relationship::{EdgeKey, RelationshipEdge, RelationshipKind};
use corkboard_core::store::{RelationshipStore, StoreError};
use corkboard_core::version::{LedgerError, VersionLedger};

use crate::collab::{ActorSource, CardDirectory};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors returned by board operations.
///
/// Conflict outcomes are not here: a stale edit is a normal
/// [`SubmitOutcome::Conflicted`], not an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// The card is unknown to the board's card directory.
    #[error("card not found: '{0}'")]
    CardNotFound(CardRef),

    #[error(transparent)]
    CircularDependency(#[from] CircularDependencyError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The source card already carries the configured maximum number of
    /// relationships.
    #[error("card '{card}' already has {limit} relationships")]
    EdgeLimitExceeded { card: CardRef, limit: usize },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),
}

impl BoardError {
    /// Machine-readable code associated with this error.
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::CardNotFound(_) => ErrorCode::CardNotFound,
            Self::CircularDependency(e) => e.code(),
            Self::Store(e) => e.code(),
            Self::EdgeLimitExceeded { .. } => ErrorCode::EdgeLimitExceeded,
            Self::Ledger(e) => e.code(),
            Self::Conflict(e) => e.code(),
        }
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

struct BoardState {
    store: RelationshipStore,
    ledger: VersionLedger,
    resolver: ConflictResolver,
    config: BoardConfig,
}

/// All collaboration state and behavior for one board.
pub struct Board {
    state: RwLock<BoardState>,
    cache: Mutex<AnalyzerCache>,
    directory: Arc<dyn CardDirectory>,
    actors: Arc<dyn ActorSource>,
    events: Arc<dyn EventSink>,
}

impl Board {
    pub fn new(
        config: BoardConfig,
        directory: Arc<dyn CardDirectory>,
        actors: Arc<dyn ActorSource>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        let resolver = ConflictResolver::new(config.conflict.clone());
        Self {
            state: RwLock::new(BoardState {
                store: RelationshipStore::new(),
                ledger: VersionLedger::new(),
                resolver,
                config,
            }),
            cache: Mutex::new(AnalyzerCache::new()),
            directory,
            actors,
            events,
        }
    }

    // -- mutations ---------------------------------------------------------

    /// Start tracking a card announced by the CRUD layer, at version 1.
    ///
    /// # Errors
    ///
    /// [`BoardError::CardNotFound`] when the directory does not know the
    /// card; [`BoardError::Ledger`] when it is already tracked.
    pub fn register_card(&self, card: CardRef, snapshot: CardSnapshot) -> Result<u64, BoardError> {
        self.require_card(&card)?;
        let actor = self.actors.current_actor();

        let version = {
            let mut state = self.write_state();
            state.ledger.create_card(card.clone(), actor.clone(), snapshot)?
        };

        self.invalidate_cache();
        self.events.publish(DomainEvent::card_committed(card, version, actor));
        Ok(version)
    }

    /// Propose a new relationship edge.
    ///
    /// Validation order: card existence, relationship limit, cycle guard,
    /// duplicate check. A rejected proposal leaves the board untouched and
    /// publishes nothing.
    ///
    /// # Errors
    ///
    /// [`BoardError::CardNotFound`], [`BoardError::EdgeLimitExceeded`],
    /// [`BoardError::CircularDependency`] (with the offending cycle path),
    /// or [`BoardError::Store`] for duplicates.
    pub fn propose_edge(
        &self,
        source: &CardRef,
        target: &CardRef,
        kind: RelationshipKind,
        description: Option<String>,
    ) -> Result<RelationshipEdge, BoardError> {
        self.require_card(source)?;
        self.require_card(target)?;
        let actor = self.actors.current_actor();

        let stored = {
            let mut state = self.write_state();

            let limit = state.config.graph.max_edges_per_card;
            if state.store.edges_for(source).count() >= limit {
                return Err(BoardError::EdgeLimitExceeded {
                    card: source.clone(),
                    limit,
                });
            }

            if Self::cycle_guarded(kind, &state.config) {
                ensure_acyclic(&state.store, kind, source, target)?;
            }

            let edge = RelationshipEdge::new(
                EdgeKey::new(source.clone(), target.clone(), kind),
                description,
                actor,
            );
            state.store.add_edge(edge)?.clone()
        };

        self.invalidate_cache();
        self.events.publish(DomainEvent::edge_added(stored.clone()));
        Ok(stored)
    }

    /// Remove a relationship edge. Idempotent: removing an absent edge is
    /// a silent no-op and publishes nothing.
    pub fn remove_edge(&self, source: &CardRef, target: &CardRef, kind: RelationshipKind) {
        let key = EdgeKey::new(source.clone(), target.clone(), kind);
        let removed = {
            let mut state = self.write_state();
            state.store.remove_edge(&key).is_some()
        };

        if removed {
            self.invalidate_cache();
            self.events.publish(DomainEvent::edge_removed(key));
        }
    }

    /// Submit an optimistic card edit tagged with the version the client
    /// last observed.
    ///
    /// Returns [`SubmitOutcome::Accepted`] or a [`SubmitOutcome::Conflicted`]
    /// case for the user to resolve; both are normal outcomes.
    ///
    /// # Errors
    ///
    /// Empty patches, untracked cards, and unknown base versions.
    pub fn submit_card_edit(
        &self,
        card: &CardRef,
        base_version: u64,
        patch: CardPatch,
    ) -> Result<SubmitOutcome, BoardError> {
        let actor = self.actors.current_actor();

        let outcome = {
            let mut state = self.write_state();
            let BoardState {
                ledger, resolver, ..
            } = &mut *state;
            resolver.submit(ledger, card, base_version, &actor, patch)?
        };

        if let SubmitOutcome::Accepted { version } = outcome {
            self.invalidate_cache();
            self.events
                .publish(DomainEvent::card_committed(card.clone(), version, actor));
        }
        Ok(outcome)
    }

    /// Apply a user's resolution to an open conflict case.
    ///
    /// # Errors
    ///
    /// [`BoardError::Conflict`] when the case is unknown or the manual
    /// payload is empty.
    pub fn resolve_conflict(
        &self,
        id: ConflictId,
        resolution: Resolution,
    ) -> Result<ResolutionOutcome, BoardError> {
        let actor = self.actors.current_actor();

        let (card, outcome) = {
            let mut state = self.write_state();
            let BoardState {
                ledger, resolver, ..
            } = &mut *state;
            let card = resolver
                .get(id)
                .map(|case| case.card.clone())
                .ok_or(ConflictError::UnknownConflict(id))?;
            let outcome = resolver.resolve(ledger, id, &actor, resolution)?;
            (card, outcome)
        };

        if let ResolutionOutcome::Accepted { version } = outcome {
            self.invalidate_cache();
            self.events
                .publish(DomainEvent::card_committed(card, version, actor));
        }
        Ok(outcome)
    }

    /// Drop an open conflict case for a client that disconnected.
    pub fn abandon_conflict(&self, id: ConflictId) -> bool {
        self.write_state().resolver.abandon(id)
    }

    // -- queries -----------------------------------------------------------

    /// The set of cards currently waiting on unfinished dependencies.
    pub fn blocked_cards(&self) -> BTreeSet<CardRef> {
        let state = self.read_state();
        let graph = BlocksGraph::from_store(&state.store);
        let ledger = &state.ledger;
        let columns = &state.config.columns;
        self.lock_cache().blocked_cards(&graph, |card| {
            ledger
                .head(card)
                .is_ok_and(|head| columns.is_terminal(&head.snapshot.column))
        })
    }

    /// The longest chain of blocking dependencies on the board.
    pub fn critical_path(&self) -> CriticalPathResult {
        let state = self.read_state();
        let graph = BlocksGraph::from_store(&state.store);
        self.lock_cache().critical_path(&graph)
    }

    /// Every card the given card waits on, directly or transitively.
    pub fn dependencies_of(&self, card: &CardRef) -> BTreeSet<CardRef> {
        let state = self.read_state();
        reachability::dependencies_of(&BlocksGraph::from_store(&state.store), card)
    }

    /// Every card waiting on the given card, directly or transitively.
    pub fn dependents_of(&self, card: &CardRef) -> BTreeSet<CardRef> {
        let state = self.read_state();
        reachability::dependents_of(&BlocksGraph::from_store(&state.store), card)
    }

    /// All relationship edges touching a card, of every kind.
    pub fn edges_for(&self, card: &CardRef) -> Vec<RelationshipEdge> {
        let state = self.read_state();
        state.store.edges_for(card).cloned().collect()
    }

    /// The card's current authoritative version.
    ///
    /// # Errors
    ///
    /// [`BoardError::Ledger`] for untracked cards.
    pub fn current_version(&self, card: &CardRef) -> Result<u64, BoardError> {
        Ok(self.read_state().ledger.current_version(card)?)
    }

    /// The card's current snapshot, for client reloads.
    ///
    /// # Errors
    ///
    /// [`BoardError::Ledger`] for untracked cards.
    pub fn head_snapshot(&self, card: &CardRef) -> Result<CardSnapshot, BoardError> {
        Ok(self.read_state().ledger.head(card)?.snapshot.clone())
    }

    /// Look up an open conflict case.
    pub fn open_conflict(&self, id: ConflictId) -> Option<ConflictCase> {
        self.read_state().resolver.get(id).cloned()
    }

    /// Number of conflict cases awaiting resolution.
    pub fn open_conflicts(&self) -> usize {
        self.read_state().resolver.open_cases()
    }

    // -- internals ---------------------------------------------------------

    const fn cycle_guarded(kind: RelationshipKind, config: &BoardConfig) -> bool {
        match kind {
            RelationshipKind::Blocks => true,
            RelationshipKind::ParentChild => config.graph.parent_cycle_guard,
            RelationshipKind::RelatesTo | RelationshipKind::Duplicate => false,
        }
    }

    fn require_card(&self, card: &CardRef) -> Result<(), BoardError> {
        if self.directory.card_exists(card) {
            Ok(())
        } else {
            Err(BoardError::CardNotFound(card.clone()))
        }
    }

    fn invalidate_cache(&self) {
        debug!("derived views invalidated");
        self.lock_cache().invalidate();
    }

    fn read_state(&self) -> RwLockReadGuard<'_, BoardState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, BoardState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, AnalyzerCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
