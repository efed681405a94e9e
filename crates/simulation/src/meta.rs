//! Pass-through state owned by external collaborators.
//!
//! Quests, settings, and world data are authored and mutated by subsystems
//! outside this core (quest scripting, options UI, worldgen). The core only
//! persists them verbatim and resets or carries them on prestige.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// One quest's persisted progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestEntry {
    pub id: String,
    pub progress: u32,
    pub completed: bool,
    pub claimed: bool,
}

#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestLog {
    pub quests: Vec<QuestEntry>,
}

/// Player-facing options. Carried through prestige.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct GameSettings {
    pub music: bool,
    pub sound: bool,
    pub language: String,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            music: true,
            sound: true,
            language: "en".to_string(),
        }
    }
}

/// Worldgen state. The seed and exploration footprint belong to the external
/// map; a prestige reset re-defaults them (a fresh world per stage).
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldState {
    pub seed: u64,
    pub visited_chunks: Vec<(i32, i32)>,
}
