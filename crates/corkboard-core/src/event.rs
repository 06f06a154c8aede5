//! Domain events published to the collaboration broadcaster.
//!
//! # Overview
//!
//! Every accepted mutation produces exactly one event. Delivery is
//! fire-and-forget: this crate publishes into an [`EventSink`] and assumes
//! nothing about subscriber count, cross-board ordering, or transport
//! retries - at-least-once delivery is the downstream channel's problem.
//!
//! Event kinds use the dotted `<noun>.<verb>` convention so stream
//! consumers can route on a stable string.

#![allow(clippy::must_use_candidate, clippy::module_name_repetitions)]

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::card::{ActorId, CardRef};
use crate::model::relationship::{EdgeKey, RelationshipEdge};

// ---------------------------------------------------------------------------
// DomainEvent
// ---------------------------------------------------------------------------

/// The three events in the collaboration catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomainEvent {
    EdgeAdded {
        edge: RelationshipEdge,
        occurred_at: DateTime<Utc>,
    },
    EdgeRemoved {
        key: EdgeKey,
        occurred_at: DateTime<Utc>,
    },
    CardCommitted {
        card: CardRef,
        version: u64,
        actor: ActorId,
        occurred_at: DateTime<Utc>,
    },
}

impl DomainEvent {
    pub fn edge_added(edge: RelationshipEdge) -> Self {
        Self::EdgeAdded {
            edge,
            occurred_at: Utc::now(),
        }
    }

    pub fn edge_removed(key: EdgeKey) -> Self {
        Self::EdgeRemoved {
            key,
            occurred_at: Utc::now(),
        }
    }

    pub fn card_committed(card: CardRef, version: u64, actor: ActorId) -> Self {
        Self::CardCommitted {
            card,
            version,
            actor,
            occurred_at: Utc::now(),
        }
    }

    /// The canonical `<noun>.<verb>` kind string.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::EdgeAdded { .. } => "edge.added",
            Self::EdgeRemoved { .. } => "edge.removed",
            Self::CardCommitted { .. } => "card.committed",
        }
    }

    pub const fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::EdgeAdded { occurred_at, .. }
            | Self::EdgeRemoved { occurred_at, .. }
            | Self::CardCommitted { occurred_at, .. } => *occurred_at,
        }
    }
}

// ---------------------------------------------------------------------------
// EventSink
// ---------------------------------------------------------------------------

/// Outbound boundary to the real-time broadcast channel.
///
/// Implementations must not block the caller for long: publication happens
/// inside the board's mutation path. This subsystem never retries delivery.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: DomainEvent);
}

/// Discards every event. Useful for boards without live subscribers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: DomainEvent) {}
}

/// Records events in memory, in publication order. Test double.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<DomainEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events published so far, oldest first.
    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Drain recorded events, leaving the sink empty.
    pub fn take(&self) -> Vec<DomainEvent> {
        self.events.lock().map(|mut e| std::mem::take(&mut *e)).unwrap_or_default()
    }
}

impl EventSink for MemorySink {
    fn publish(&self, event: DomainEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
