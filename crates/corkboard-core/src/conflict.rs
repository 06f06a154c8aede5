//! Conflict detection and resolution for concurrent card edits.
//!
//! # Overview
//!
//! Clients edit optimistically: an edit carries the card version its author
//! last observed. When the version is stale the resolver packages both
//! sides of the disagreement into a [`ConflictCase`] - the local patch, the
//! field-level diff the other writers produced, and both version numbers -
//! and hands it back without committing anything. The submitting user then
//! chooses a [`Resolution`]:
//!
//! - **KeepLocal** - re-commit the local values at the now-current version.
//!   An explicit overwrite with the user's consent.
//! - **KeepRemote** - discard the local change; the client reloads the
//!   server snapshot. Nothing is committed.
//! - **Manual** - the client supplies a merged patch, committed like
//!   KeepLocal.
//!
//! # State machine
//!
//! Submitted → Accepted (terminal)
//! Submitted → Conflicted → Resolved-Local / Resolved-Remote /
//! Resolved-Manual (terminal), or abandoned by disconnect.
//!
//! Open cases are held in memory only; an abandoned case needs no cleanup
//! because a conflicted submission never committed anything.
//!
//! # Auto-merge
//!
//! With `conflict.auto_merge_disjoint_fields` enabled, a stale edit whose
//! fields are disjoint from everything the other writers changed is rebased
//! onto the current snapshot and committed directly; only genuinely
//! overlapping field changes surface a case. Off by default.

#![allow(clippy::must_use_candidate, clippy::module_name_repetitions)]

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::ConflictConfig;
use crate::error::ErrorCode;
use crate::model::card::{ActorId, CardField, CardPatch, CardRef, CardSnapshot};
use crate::version::{CommitOutcome, LedgerError, VersionLedger};

// ---------------------------------------------------------------------------
// Identity and outcome types
// ---------------------------------------------------------------------------

/// Identifier of an open conflict case, unique per board process.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ConflictId(u64);

impl fmt::Display for ConflictId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conflict-{}", self.0)
    }
}

/// One field on which the server moved past the submitter's base version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDiff {
    pub field: CardField,
    /// Value at the submitter's base version.
    pub base: Value,
    /// Value at the current server version.
    pub remote: Value,
}

/// The packaged description of a detected version mismatch, offered to the
/// submitting user for resolution. Ephemeral: never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictCase {
    pub id: ConflictId,
    pub card: CardRef,
    /// The version the client based its edit on.
    pub base_version: u64,
    /// The authoritative version at detection time.
    pub current_version: u64,
    /// The client's unapplied patch.
    pub local_change: CardPatch,
    /// Field-level diff from `base_version` to `current_version`, so a
    /// human can see exactly what the other writers changed.
    pub remote_change: Vec<FieldDiff>,
    /// The full current server snapshot, for display and reloads.
    pub remote_snapshot: CardSnapshot,
    pub opened_at: DateTime<Utc>,
}

impl ConflictCase {
    /// Fields changed on both sides - the genuinely contested ones.
    pub fn overlapping_fields(&self) -> Vec<CardField> {
        let local = self.local_change.changed_fields();
        self.remote_change
            .iter()
            .map(|d| d.field)
            .filter(|f| local.contains(f))
            .collect()
    }
}

/// Outcome of a submitted edit. Both variants are normal outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted { version: u64 },
    Conflicted(ConflictCase),
}

/// The user's choice for settling a conflict case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    KeepLocal,
    KeepRemote,
    Manual(CardPatch),
}

/// Outcome of resolving a conflict case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// A commit occurred; the card is now at `version`.
    Accepted { version: u64 },
    /// The local change was discarded; the client should reload the
    /// server snapshot. Nothing was committed.
    Abandoned,
}

/// Errors returned by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    /// The edit changes no field; no version number is spent on no-ops.
    #[error("edit contains no changes")]
    EmptyPatch,

    /// The referenced case was already resolved, abandoned, or never
    /// existed.
    #[error("no open conflict case '{0}'")]
    UnknownConflict(ConflictId),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl ConflictError {
    /// Machine-readable code associated with this error.
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyPatch => ErrorCode::EmptyPatch,
            Self::UnknownConflict(_) => ErrorCode::UnknownConflict,
            Self::Ledger(e) => e.code(),
        }
    }
}

// ---------------------------------------------------------------------------
// Diff helpers
// ---------------------------------------------------------------------------

/// Field-level diff between two snapshots, in catalog order.
pub fn snapshot_diff(base: &CardSnapshot, remote: &CardSnapshot) -> Vec<FieldDiff> {
    CardField::ALL
        .into_iter()
        .filter_map(|field| {
            let base_value = base.field_value(field);
            let remote_value = remote.field_value(field);
            (base_value != remote_value).then_some(FieldDiff {
                field,
                base: base_value,
                remote: remote_value,
            })
        })
        .collect()
}

fn fields_overlap(local: &[CardField], remote: &[FieldDiff]) -> bool {
    remote.iter().any(|d| local.contains(&d.field))
}

// ---------------------------------------------------------------------------
// ConflictResolver
// ---------------------------------------------------------------------------

/// Turns stale submissions into conflict cases and applies resolutions.
///
/// The resolver owns the registry of open cases. It must run under the same
/// exclusive write boundary as the ledger it mutates; within that boundary
/// resolution commits cannot lose a race, which is why `KeepLocal` always
/// succeeds.
#[derive(Debug, Default)]
pub struct ConflictResolver {
    config: ConflictConfig,
    next_id: u64,
    open: HashMap<ConflictId, ConflictCase>,
}

impl ConflictResolver {
    pub fn new(config: ConflictConfig) -> Self {
        Self {
            config,
            next_id: 0,
            open: HashMap::new(),
        }
    }

    /// Submit an optimistic edit.
    ///
    /// Returns [`SubmitOutcome::Accepted`] when the base version matched
    /// and the commit landed, or [`SubmitOutcome::Conflicted`] with a newly
    /// opened case when it was stale.
    ///
    /// # Errors
    ///
    /// [`ConflictError::EmptyPatch`] for no-op edits; ledger errors when
    /// the card is untracked or the claimed base version never existed.
    pub fn submit(
        &mut self,
        ledger: &mut VersionLedger,
        card: &CardRef,
        base_version: u64,
        author: &ActorId,
        patch: CardPatch,
    ) -> Result<SubmitOutcome, ConflictError> {
        if patch.is_empty() {
            return Err(ConflictError::EmptyPatch);
        }

        let head = ledger.head(card)?.snapshot.clone();
        let proposed = patch.apply_to(&head);
        match ledger.commit(card, base_version, author.clone(), proposed)? {
            CommitOutcome::Committed { version } => Ok(SubmitOutcome::Accepted { version }),
            CommitOutcome::Conflict { current, .. } => {
                let base = ledger.at_version(card, base_version)?.snapshot.clone();
                let remote_snapshot = ledger.head(card)?.snapshot.clone();
                let remote_change = snapshot_diff(&base, &remote_snapshot);

                if self.config.auto_merge_disjoint_fields
                    && !fields_overlap(&patch.changed_fields(), &remote_change)
                {
                    let rebased = patch.apply_to(&remote_snapshot);
                    if let CommitOutcome::Committed { version } =
                        ledger.commit(card, current, author.clone(), rebased)?
                    {
                        debug!(card = %card, version, "disjoint edit auto-merged");
                        return Ok(SubmitOutcome::Accepted { version });
                    }
                }

                let case = ConflictCase {
                    id: self.allocate_id(),
                    card: card.clone(),
                    base_version,
                    current_version: current,
                    local_change: patch,
                    remote_change,
                    remote_snapshot,
                    opened_at: Utc::now(),
                };
                debug!(
                    card = %card,
                    case = %case.id,
                    base = base_version,
                    current,
                    "conflict case opened"
                );
                self.open.insert(case.id, case.clone());
                Ok(SubmitOutcome::Conflicted(case))
            }
        }
    }

    /// Apply the user's resolution to an open case.
    ///
    /// `KeepLocal` and `Manual` commit at the now-current version: the head
    /// is re-read and the commit re-attempted until it lands, which under
    /// the engine's write boundary is the first attempt.
    ///
    /// # Errors
    ///
    /// [`ConflictError::UnknownConflict`] when the case is not open;
    /// [`ConflictError::EmptyPatch`] for an empty manual payload; ledger
    /// errors when the card vanished from the ledger.
    pub fn resolve(
        &mut self,
        ledger: &mut VersionLedger,
        id: ConflictId,
        author: &ActorId,
        resolution: Resolution,
    ) -> Result<ResolutionOutcome, ConflictError> {
        let case = self
            .open
            .get(&id)
            .ok_or(ConflictError::UnknownConflict(id))?;
        let card = case.card.clone();

        let patch = match resolution {
            Resolution::KeepRemote => {
                self.open.remove(&id);
                debug!(card = %card, case = %id, "conflict resolved: local change discarded");
                return Ok(ResolutionOutcome::Abandoned);
            }
            Resolution::KeepLocal => case.local_change.clone(),
            Resolution::Manual(patch) => {
                if patch.is_empty() {
                    return Err(ConflictError::EmptyPatch);
                }
                patch
            }
        };

        loop {
            let current = ledger.current_version(&card)?;
            let head = ledger.head(&card)?.snapshot.clone();
            match ledger.commit(&card, current, author.clone(), patch.apply_to(&head))? {
                CommitOutcome::Committed { version } => {
                    self.open.remove(&id);
                    debug!(card = %card, case = %id, version, "conflict resolved: committed");
                    return Ok(ResolutionOutcome::Accepted { version });
                }
                // The head advanced between the read and the commit. Only
                // possible without an exclusive boundary; adopt the newer
                // head and try again.
                CommitOutcome::Conflict { .. } => {}
            }
        }
    }

    /// Drop an open case without resolving it (client disconnected).
    ///
    /// Returns `true` if a case was dropped. Nothing was committed for a
    /// conflicted submission, so there is nothing to roll back.
    pub fn abandon(&mut self, id: ConflictId) -> bool {
        let dropped = self.open.remove(&id).is_some();
        if dropped {
            debug!(case = %id, "conflict case abandoned");
        }
        dropped
    }

    /// Look up an open case.
    pub fn get(&self, id: ConflictId) -> Option<&ConflictCase> {
        self.open.get(&id)
    }

    /// Number of currently open cases.
    pub fn open_cases(&self) -> usize {
        self.open.len()
    }

    fn allocate_id(&mut self) -> ConflictId {
        self.next_id += 1;
        ConflictId(self.next_id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
