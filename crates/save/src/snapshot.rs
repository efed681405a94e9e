//! Collects the live world into a `SaveData` document.

use bevy::prelude::*;
use simulation::achievements::AchievementTracker;
use simulation::buildings::Buildings;
use simulation::economy::ResourceLedger;
use simulation::inventory::{Equipment, Inventory};
use simulation::meta::{GameSettings, QuestLog, WorldState};
use simulation::player::PlayerState;
use simulation::prestige::PortalStage;
use simulation::processing::ProcessingQueue;
use simulation::skills::Skills;
use simulation::stats::GameStats;
use simulation::technologies::Technologies;
use simulation::tools::Tools;

use crate::save_types::{
    SaveData, SaveItemStack, SaveJob, SavePlacedBuilding, SavePlayer, SaveQuest, SaveSettings,
    SaveSkill, SaveStats, SaveWorld,
};

/// Reads every persistable resource into a fresh document. Read-only; the
/// caller stamps `last_online_time_ms` before invoking this.
pub fn collect_save_data(world: &World) -> SaveData {
    let player = world.resource::<PlayerState>();
    let ledger = world.resource::<ResourceLedger>();
    let stats = world.resource::<GameStats>();
    let inventory = world.resource::<Inventory>();
    let equipment = world.resource::<Equipment>();
    let tools = world.resource::<Tools>();
    let technologies = world.resource::<Technologies>();
    let skills = world.resource::<Skills>();
    let buildings = world.resource::<Buildings>();
    let queue = world.resource::<ProcessingQueue>();
    let achievements = world.resource::<AchievementTracker>();
    let quests = world.resource::<QuestLog>();
    let settings = world.resource::<GameSettings>();
    let world_state = world.resource::<WorldState>();
    let portal = world.resource::<PortalStage>();

    SaveData {
        player: SavePlayer {
            level: player.level,
            xp: player.xp,
            energy: player.energy,
            max_energy: player.max_energy,
            last_energy_update_ms: player.last_energy_update_ms,
            vip_status: player.vip_status,
            vip_expires_ms: player.vip_expires_ms,
            prestige_multiplier: player.prestige_multiplier,
            prestige_level: player.prestige_level,
        },
        resources: ledger.to_map(),
        inventory: inventory
            .slots
            .iter()
            .map(|slot| {
                slot.as_ref().map(|stack| SaveItemStack {
                    item_id: stack.item_id.clone(),
                    count: stack.count,
                })
            })
            .collect(),
        equipped: equipment.equipped.clone(),
        tools: tools.levels.clone(),
        stats: SaveStats {
            total_resources_gathered: stats.total_resources_gathered,
            total_crafted: stats.total_crafted,
            total_xp: stats.total_xp,
            daily_streak: stats.daily_streak,
            last_daily_claim_ms: stats.last_daily_claim_ms,
            last_online_time_ms: stats.last_online_time_ms,
            stars: stats.stars,
        },
        achievements: achievements.unlocked.iter().cloned().collect(),
        technologies: technologies.unlocked.iter().cloned().collect(),
        processing_queue: queue
            .jobs
            .iter()
            .map(|job| SaveJob {
                id: job.id,
                recipe_id: job.recipe.id().to_string(),
                start_time_ms: job.start_time_ms,
                duration_ms: job.duration_ms,
                completed: job.completed,
            })
            .collect(),
        quests: quests
            .quests
            .iter()
            .map(|q| SaveQuest {
                id: q.id.clone(),
                progress: q.progress,
                completed: q.completed,
                claimed: q.claimed,
            })
            .collect(),
        settings: SaveSettings {
            music: settings.music,
            sound: settings.sound,
            language: settings.language.clone(),
        },
        buildings: buildings.counts.clone(),
        placed_buildings: buildings
            .placed
            .iter()
            .map(|p| SavePlacedBuilding {
                id: p.id,
                kind: p.kind.clone(),
                x: p.x,
                y: p.y,
                last_production_ms: p.last_production_ms,
            })
            .collect(),
        skills: skills
            .progress
            .iter()
            .map(|(id, s)| {
                (
                    id.clone(),
                    SaveSkill {
                        level: s.level,
                        xp: s.xp,
                    },
                )
            })
            .collect(),
        world: SaveWorld {
            seed: world_state.seed,
            visited_chunks: world_state.visited_chunks.clone(),
        },
        portal_stage: portal.0,
        ..SaveData::default()
    }
}
