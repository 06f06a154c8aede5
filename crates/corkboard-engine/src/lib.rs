//! corkboard-engine library.
//!
//! One [`board::Board`] instance per kanban board. Mutations serialize on
//! the board's write lock; analytics run concurrently under the read lock.
//! Collaborators plug in through the traits in [`collab`] and the event
//! sink from `corkboard_core::event`.

pub mod board;
pub mod collab;
pub mod telemetry;

pub use board::{Board, BoardError};
pub use collab::{ActorSource, CardDirectory, StaticDirectory, SwitchableActor};
