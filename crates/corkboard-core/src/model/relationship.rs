//! Typed relationships between cards.
//!
//! # Overview
//!
//! Cards declare directed, typed relationships to other cards on the same
//! board. The four kinds have different semantics:
//!
//! - **Blocks** — scheduling dependency: the source card cannot be
//!   considered complete until the target card is. The blocks subgraph must
//!   stay acyclic (see [`crate::graph::cycles`]).
//! - **RelatesTo** — informational link, no scheduling effect.
//! - **Duplicate** — the source duplicates the target.
//! - **ParentChild** — containment: source is the parent of target.
//!
//! Edges are unique per `(source, target, kind)` and owned by the board's
//! relationship store; nothing mutates them in place.

#![allow(clippy::must_use_candidate, clippy::module_name_repetitions)]

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::card::{ActorId, CardRef};
use crate::error::ErrorCode;

// ---------------------------------------------------------------------------
// RelationshipKind
// ---------------------------------------------------------------------------

/// The four relationship kinds in the catalog.
///
/// A closed enum: every consumer matches exhaustively, so a kind added
/// later cannot be silently ignored anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    Blocks,
    RelatesTo,
    Duplicate,
    ParentChild,
}

impl RelationshipKind {
    /// All relationship kinds in catalog order.
    pub const ALL: [Self; 4] = [
        Self::Blocks,
        Self::RelatesTo,
        Self::Duplicate,
        Self::ParentChild,
    ];

    /// Canonical `snake_case` string representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blocks => "blocks",
            Self::RelatesTo => "relates_to",
            Self::Duplicate => "duplicate",
            Self::ParentChild => "parent_child",
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown relationship kind string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "unknown relationship kind '{raw}': expected one of blocks, relates_to, \
     duplicate, parent_child"
)]
pub struct UnknownRelationshipKind {
    /// The unrecognised input string.
    pub raw: String,
}

impl UnknownRelationshipKind {
    /// Machine-readable code associated with this error.
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::InvalidRelationshipKind
    }
}

impl FromStr for RelationshipKind {
    type Err = UnknownRelationshipKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blocks" => Ok(Self::Blocks),
            "relates_to" => Ok(Self::RelatesTo),
            "duplicate" => Ok(Self::Duplicate),
            "parent_child" => Ok(Self::ParentChild),
            _ => Err(UnknownRelationshipKind { raw: s.to_string() }),
        }
    }
}

// ---------------------------------------------------------------------------
// EdgeKey / RelationshipEdge
// ---------------------------------------------------------------------------

/// Relationship identity tuple.
///
/// Edges are unique by `(source, target, kind)`; multiple kinds may coexist
/// between the same pair of cards.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    pub source: CardRef,
    pub target: CardRef,
    pub kind: RelationshipKind,
}

impl EdgeKey {
    pub fn new(source: CardRef, target: CardRef, kind: RelationshipKind) -> Self {
        Self {
            source,
            target,
            kind,
        }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -[{}]-> {}", self.source, self.kind, self.target)
    }
}

/// A directed, typed relationship between two cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipEdge {
    pub key: EdgeKey,
    /// Optional free-form note shown alongside the relationship.
    pub description: Option<String>,
    pub created_by: ActorId,
    pub created_at: DateTime<Utc>,
}

impl RelationshipEdge {
    /// Create a new edge stamped with the current time.
    pub fn new(key: EdgeKey, description: Option<String>, created_by: ActorId) -> Self {
        Self {
            key,
            description,
            created_by,
            created_at: Utc::now(),
        }
    }

    pub fn source(&self) -> &CardRef {
        &self.key.source
    }

    pub fn target(&self) -> &CardRef {
        &self.key.target
    }

    pub const fn kind(&self) -> RelationshipKind {
        self.key.kind
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
