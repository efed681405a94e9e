//! The persisted save schema.
//!
//! One JSON document per backend key. Every struct carries
//! `#[serde(default)]` so a partially-written or older document
//! deserializes; the merge engine is the first line of defense, the serde
//! defaults are the second.
//!
//! Field changes here are schema changes: there are no migration scripts,
//! only the structural merge against `SaveData::default()`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::save_error::SaveError;

/// Bumped when the schema changes shape. After merge, a loaded document
/// always reports this version.
pub const CURRENT_SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveData {
    pub version: u32,
    pub player: SavePlayer,
    pub resources: BTreeMap<String, f64>,
    pub inventory: Vec<Option<SaveItemStack>>,
    pub equipped: BTreeMap<String, Option<String>>,
    pub tools: BTreeMap<String, u32>,
    pub stats: SaveStats,
    pub achievements: Vec<String>,
    pub technologies: Vec<String>,
    pub processing_queue: Vec<SaveJob>,
    pub quests: Vec<SaveQuest>,
    pub settings: SaveSettings,
    pub buildings: BTreeMap<String, u32>,
    pub placed_buildings: Vec<SavePlacedBuilding>,
    pub skills: BTreeMap<String, SaveSkill>,
    pub world: SaveWorld,
    pub portal_stage: u32,
}

impl Default for SaveData {
    fn default() -> Self {
        Self {
            version: CURRENT_SAVE_VERSION,
            player: SavePlayer::default(),
            resources: BTreeMap::new(),
            inventory: Vec::new(),
            equipped: BTreeMap::new(),
            tools: BTreeMap::new(),
            stats: SaveStats::default(),
            achievements: Vec::new(),
            technologies: Vec::new(),
            processing_queue: Vec::new(),
            quests: Vec::new(),
            settings: SaveSettings::default(),
            buildings: BTreeMap::new(),
            placed_buildings: Vec::new(),
            skills: BTreeMap::new(),
            world: SaveWorld::default(),
            portal_stage: 0,
        }
    }
}

impl SaveData {
    /// Serializes to the JSON document stored under the backend key.
    pub fn encode(&self) -> Result<String, SaveError> {
        serde_json::to_string(self).map_err(|e| SaveError::Encode(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SavePlayer {
    pub level: u32,
    pub xp: u64,
    pub energy: u32,
    pub max_energy: u32,
    pub last_energy_update_ms: u64,
    pub vip_status: bool,
    pub vip_expires_ms: u64,
    pub prestige_multiplier: f64,
    pub prestige_level: u32,
}

impl Default for SavePlayer {
    fn default() -> Self {
        Self {
            level: 1,
            xp: 0,
            energy: 100,
            max_energy: 100,
            last_energy_update_ms: 0,
            vip_status: false,
            vip_expires_ms: 0,
            prestige_multiplier: 1.0,
            prestige_level: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveStats {
    pub total_resources_gathered: f64,
    pub total_crafted: u64,
    pub total_xp: u64,
    pub daily_streak: u32,
    pub last_daily_claim_ms: u64,
    pub last_online_time_ms: u64,
    pub stars: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveItemStack {
    pub item_id: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveJob {
    pub id: u64,
    pub recipe_id: String,
    pub start_time_ms: u64,
    pub duration_ms: u64,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveQuest {
    pub id: String,
    pub progress: u32,
    pub completed: bool,
    pub claimed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveSettings {
    pub music: bool,
    pub sound: bool,
    pub language: String,
}

impl Default for SaveSettings {
    fn default() -> Self {
        Self {
            music: true,
            sound: true,
            language: "en".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SavePlacedBuilding {
    pub id: u64,
    pub kind: String,
    pub x: i32,
    pub y: i32,
    pub last_production_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveSkill {
    pub level: u32,
    pub xp: u64,
}

impl Default for SaveSkill {
    fn default() -> Self {
        Self { level: 1, xp: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveWorld {
    pub seed: u64,
    pub visited_chunks: Vec<(i32, i32)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_self_consistent() {
        let data = SaveData::default();
        assert_eq!(data.version, CURRENT_SAVE_VERSION);
        assert_eq!(data.player.level, 1);
        assert_eq!(data.player.energy, data.player.max_energy);
        assert!(data.resources.is_empty());
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let mut data = SaveData::default();
        data.resources.insert("wood".to_string(), 12.5);
        data.processing_queue.push(SaveJob {
            id: 3,
            recipe_id: "charcoal".to_string(),
            start_time_ms: 1,
            duration_ms: 10_000,
            completed: false,
        });
        let json = data.encode().unwrap();
        let back: SaveData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let back: SaveData = serde_json::from_str(r#"{"portal_stage": 2}"#).unwrap();
        assert_eq!(back.portal_stage, 2);
        assert_eq!(back.version, CURRENT_SAVE_VERSION);
        assert_eq!(back.player.level, 1);
        assert_eq!(back.settings.language, "en");
    }
}
