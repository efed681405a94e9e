//! Save/load state machine.
//!
//! The save crate drives the actual work via exclusive systems on
//! `OnEnter(...)`; the simulation crate owns the state type so that gameplay
//! systems can gate on it without depending on the save crate.

use bevy::prelude::*;

/// Tracks whether a save/load operation is in progress.
///
/// Transitions: `Idle -> Saving -> Idle`, `Idle -> Loading -> Idle`,
/// `Idle -> NewGame -> Idle`, `Idle -> Portal -> Idle`.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SaveLoadState {
    /// Normal gameplay — no save/load operation in progress.
    #[default]
    Idle,
    /// A save operation is in progress.
    Saving,
    /// A load operation is in progress.
    Loading,
    /// A new-game reset is in progress.
    NewGame,
    /// A prestige (portal) reset is in progress.
    Portal,
}
