//! Inbound collaborator boundaries.
//!
//! The engine never owns card CRUD or authentication; it consumes them
//! through these traits. Production wiring adapts the application's board
//! service and auth session; the in-memory implementations here serve
//! embedding and tests.

use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError, RwLock};

use corkboard_core::model::card::{ActorId, CardRef};

/// Card existence and membership, provided by the board CRUD layer.
pub trait CardDirectory: Send + Sync {
    fn card_exists(&self, card: &CardRef) -> bool;
    fn cards_in_board(&self) -> BTreeSet<CardRef>;
}

/// Identity of the acting collaborator, provided by the auth layer.
pub trait ActorSource: Send + Sync {
    fn current_actor(&self) -> ActorId;
}

// ---------------------------------------------------------------------------
// In-memory implementations
// ---------------------------------------------------------------------------

/// A directory backed by an in-memory card set.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    cards: RwLock<BTreeSet<CardRef>>,
}

impl StaticDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory pre-populated with the given cards.
    #[must_use]
    pub fn with_cards<I>(cards: I) -> Self
    where
        I: IntoIterator<Item = CardRef>,
    {
        Self {
            cards: RwLock::new(cards.into_iter().collect()),
        }
    }

    pub fn insert(&self, card: CardRef) {
        self.cards
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(card);
    }

    pub fn remove(&self, card: &CardRef) {
        self.cards
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(card);
    }
}

impl CardDirectory for StaticDirectory {
    fn card_exists(&self, card: &CardRef) -> bool {
        self.cards
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(card)
    }

    fn cards_in_board(&self) -> BTreeSet<CardRef> {
        self.cards
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// An actor source whose identity can be switched between calls.
///
/// Lets a sequential test play several collaborators against one board.
#[derive(Debug)]
pub struct SwitchableActor {
    current: Mutex<ActorId>,
}

impl SwitchableActor {
    #[must_use]
    pub fn new(actor: ActorId) -> Self {
        Self {
            current: Mutex::new(actor),
        }
    }

    pub fn set(&self, actor: ActorId) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = actor;
    }
}

impl ActorSource for SwitchableActor {
    fn current_actor(&self) -> ActorId {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_directory_tracks_membership() {
        let directory = StaticDirectory::with_cards([CardRef::from("c-1")]);
        assert!(directory.card_exists(&CardRef::from("c-1")));
        assert!(!directory.card_exists(&CardRef::from("c-2")));

        directory.insert(CardRef::from("c-2"));
        assert!(directory.card_exists(&CardRef::from("c-2")));
        assert_eq!(directory.cards_in_board().len(), 2);

        directory.remove(&CardRef::from("c-1"));
        assert!(!directory.card_exists(&CardRef::from("c-1")));
    }

    #[test]
    fn switchable_actor_switches() {
        let actors = SwitchableActor::new(ActorId::from("alice"));
        assert_eq!(actors.current_actor(), ActorId::from("alice"));
        actors.set(ActorId::from("bob"));
        assert_eq!(actors.current_actor(), ActorId::from("bob"));
    }
}
