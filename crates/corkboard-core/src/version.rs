//! Per-card version ledger: the single source of truth for "what version
//! is this card at, and who wrote it".
//!
//! # Overview
//!
//! Every accepted card mutation advances the card's version by exactly one.
//! A submitted edit carries the version its author last observed; when that
//! does not match the current version, [`VersionLedger::commit`] reports a
//! [`CommitOutcome::Conflict`] instead of committing. Conflicts are a
//! frequent, expected outcome of multi-user editing, so they live in the
//! `Ok` position of the result.
//!
//! The ledger retains the full version history per card so the conflict
//! resolver can diff the submitted base version against the current head.
//!
//! # Concurrency
//!
//! All methods take `&self`/`&mut self`; the owner of the ledger (the board
//! engine) holds it behind an exclusive write boundary, which is what makes
//! check-and-increment atomic. The ledger itself contains no locks.

#![allow(clippy::must_use_candidate, clippy::module_name_repetitions)]

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ErrorCode;
use crate::model::card::{ActorId, CardRef, CardSnapshot};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One accepted version of a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardVersion {
    /// Strictly increasing per card, starting at 1.
    pub version: u64,
    /// The collaborator whose edit produced this version.
    pub author: ActorId,
    pub snapshot: CardSnapshot,
    pub committed_at: DateTime<Utc>,
}

/// Result of a commit attempt. Both variants are normal outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The expected version matched; the card advanced to `version`.
    Committed { version: u64 },
    /// The expected version was stale. Nothing was committed.
    Conflict { current: u64, attempted: u64 },
}

/// Errors returned by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("card not found: '{0}'")]
    CardNotFound(CardRef),

    /// `create_card` was called for a card the ledger already tracks.
    #[error("card '{0}' is already tracked")]
    CardAlreadyTracked(CardRef),

    /// The requested historical version does not exist for the card.
    #[error("card '{card}' has no version {version}")]
    VersionNotFound { card: CardRef, version: u64 },
}

impl LedgerError {
    /// Machine-readable code associated with this error.
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::CardNotFound(_) => ErrorCode::CardNotFound,
            Self::CardAlreadyTracked(_) => ErrorCode::CardAlreadyTracked,
            Self::VersionNotFound { .. } => ErrorCode::VersionNotFound,
        }
    }
}

// ---------------------------------------------------------------------------
// VersionLedger
// ---------------------------------------------------------------------------

/// Version history for every card on one board.
#[derive(Debug, Clone, Default)]
pub struct VersionLedger {
    /// Ascending by version; the last entry is the head.
    cards: HashMap<CardRef, Vec<CardVersion>>,
}

impl VersionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a card at version 1.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::CardAlreadyTracked`] if the card exists.
    pub fn create_card(
        &mut self,
        card: CardRef,
        author: ActorId,
        snapshot: CardSnapshot,
    ) -> Result<u64, LedgerError> {
        if self.cards.contains_key(&card) {
            return Err(LedgerError::CardAlreadyTracked(card));
        }
        debug!(card = %card, "card registered at version 1");
        self.cards.insert(
            card,
            vec![CardVersion {
                version: 1,
                author,
                snapshot,
                committed_at: Utc::now(),
            }],
        );
        Ok(1)
    }

    pub fn contains(&self, card: &CardRef) -> bool {
        self.cards.contains_key(card)
    }

    /// The current version number of a card.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::CardNotFound`] for untracked cards.
    pub fn current_version(&self, card: &CardRef) -> Result<u64, LedgerError> {
        self.head(card).map(|v| v.version)
    }

    /// The latest accepted version of a card.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::CardNotFound`] for untracked cards.
    pub fn head(&self, card: &CardRef) -> Result<&CardVersion, LedgerError> {
        self.cards
            .get(card)
            .and_then(|history| history.last())
            .ok_or_else(|| LedgerError::CardNotFound(card.clone()))
    }

    /// A specific historical version of a card.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::CardNotFound`] for untracked cards and
    /// [`LedgerError::VersionNotFound`] when the version is not in the
    /// card's history.
    pub fn at_version(&self, card: &CardRef, version: u64) -> Result<&CardVersion, LedgerError> {
        let history = self
            .cards
            .get(card)
            .ok_or_else(|| LedgerError::CardNotFound(card.clone()))?;
        history
            .iter()
            .find(|v| v.version == version)
            .ok_or_else(|| LedgerError::VersionNotFound {
                card: card.clone(),
                version,
            })
    }

    /// The full accepted history of a card, ascending by version.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::CardNotFound`] for untracked cards.
    pub fn history(&self, card: &CardRef) -> Result<&[CardVersion], LedgerError> {
        self.cards
            .get(card)
            .map(Vec::as_slice)
            .ok_or_else(|| LedgerError::CardNotFound(card.clone()))
    }

    /// Attempt an optimistic commit.
    ///
    /// When `expected_version` equals the card's current version, the card
    /// advances to `expected_version + 1` with `author` recorded as the
    /// writer, and the call returns [`CommitOutcome::Committed`]. Otherwise
    /// nothing changes and the call returns [`CommitOutcome::Conflict`]
    /// with the current version, so the caller can build a conflict case.
    ///
    /// Rejected attempts never consume a version number.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::CardNotFound`] for untracked cards.
    pub fn commit(
        &mut self,
        card: &CardRef,
        expected_version: u64,
        author: ActorId,
        snapshot: CardSnapshot,
    ) -> Result<CommitOutcome, LedgerError> {
        let history = self
            .cards
            .get_mut(card)
            .ok_or_else(|| LedgerError::CardNotFound(card.clone()))?;
        let current = history.last().map_or(0, |v| v.version);

        if expected_version != current {
            debug!(
                card = %card,
                current,
                attempted = expected_version,
                "stale commit refused"
            );
            return Ok(CommitOutcome::Conflict {
                current,
                attempted: expected_version,
            });
        }

        let version = current + 1;
        history.push(CardVersion {
            version,
            author,
            snapshot,
            committed_at: Utc::now(),
        });
        debug!(card = %card, version, "commit accepted");
        Ok(CommitOutcome::Committed { version })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
