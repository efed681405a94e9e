//! Applies a merged `SaveData` document onto the live world.
//!
//! Values are sanitized on the way in rather than trusted: quantities clamp
//! to their invariants, jobs with unknown recipes are dropped with a
//! warning, and catalog-keyed maps start from defaults so a sparse document
//! never loses a catalog entry.

use bevy::prelude::*;
use simulation::achievements::AchievementTracker;
use simulation::buildings::{Buildings, PlacedBuilding};
use simulation::economy::ResourceLedger;
use simulation::inventory::{Equipment, Inventory, ItemStack};
use simulation::meta::{GameSettings, QuestEntry, QuestLog, WorldState};
use simulation::offline::PendingOfflineReport;
use simulation::player::PlayerState;
use simulation::prestige::PortalStage;
use simulation::processing::{Job, ProcessingQueue, RecipeKind};
use simulation::skills::{SkillProgress, Skills};
use simulation::stats::GameStats;
use simulation::technologies::Technologies;
use simulation::tools::Tools;

use crate::save_types::SaveData;

pub fn restore_resources_from_save(world: &mut World, save: &SaveData, now_ms: u64) {
    // --- Player ---
    let p = &save.player;
    world.insert_resource(PlayerState {
        level: p.level.max(1),
        xp: p.xp,
        energy: p.energy.min(p.max_energy),
        max_energy: p.max_energy.max(1),
        last_energy_update_ms: p.last_energy_update_ms,
        vip_status: p.vip_status,
        vip_expires_ms: p.vip_expires_ms,
        prestige_multiplier: p.prestige_multiplier.max(1.0),
        prestige_level: p.prestige_level,
    });

    // --- Resources (negative amounts heal to zero) ---
    let mut ledger = ResourceLedger::default();
    ledger.set_amounts(
        save.resources
            .iter()
            .map(|(id, amount)| (id.clone(), amount.max(0.0)))
            .collect(),
    );
    world.insert_resource(ledger);

    // --- Stats ---
    let s = &save.stats;
    world.insert_resource(GameStats {
        total_resources_gathered: s.total_resources_gathered,
        total_crafted: s.total_crafted,
        total_xp: s.total_xp,
        daily_streak: s.daily_streak,
        last_daily_claim_ms: s.last_daily_claim_ms,
        last_online_time_ms: s.last_online_time_ms,
        stars: s.stars,
    });

    // --- Inventory & equipment ---
    world.insert_resource(Inventory {
        slots: save
            .inventory
            .iter()
            .map(|slot| {
                slot.as_ref().map(|stack| ItemStack {
                    item_id: stack.item_id.clone(),
                    count: stack.count,
                })
            })
            .collect(),
    });
    let mut equipment = Equipment::default();
    for (slot, item) in &save.equipped {
        equipment.equipped.insert(slot.clone(), item.clone());
    }
    world.insert_resource(equipment);

    // --- Tools / technologies / achievements / skills ---
    let mut tools = Tools::default();
    for (id, level) in &save.tools {
        tools.levels.insert(id.clone(), *level);
    }
    world.insert_resource(tools);

    world.insert_resource(Technologies {
        unlocked: save.technologies.iter().cloned().collect(),
    });
    world.insert_resource(AchievementTracker {
        unlocked: save.achievements.iter().cloned().collect(),
    });

    let mut skills = Skills::default();
    for (id, sk) in &save.skills {
        skills.progress.insert(
            id.clone(),
            SkillProgress {
                level: sk.level.max(1),
                xp: sk.xp,
            },
        );
    }
    world.insert_resource(skills);

    // --- Processing queue ---
    let mut jobs = Vec::with_capacity(save.processing_queue.len());
    for job in &save.processing_queue {
        let Some(recipe) = RecipeKind::from_id(&job.recipe_id) else {
            warn!("dropping saved job {} with unknown recipe '{}'", job.id, job.recipe_id);
            continue;
        };
        jobs.push(Job {
            id: job.id,
            recipe,
            start_time_ms: job.start_time_ms,
            duration_ms: job.duration_ms,
            completed: job.completed,
        });
    }
    let mut queue = ProcessingQueue::default();
    queue.set_jobs(jobs);
    world.insert_resource(queue);

    // --- Buildings ---
    let mut buildings = Buildings::default();
    buildings.counts = save.buildings.clone();
    buildings.set_placed(
        save.placed_buildings
            .iter()
            .map(|p| PlacedBuilding {
                id: p.id,
                kind: p.kind.clone(),
                x: p.x,
                y: p.y,
                last_production_ms: p.last_production_ms,
            })
            .collect(),
    );
    // Production anchors restart at now. The absence is the offline
    // simulator's to pay out; online accrual must not double-credit it.
    for kind in save.buildings.keys() {
        buildings.last_production_ms.insert(kind.clone(), now_ms);
    }
    world.insert_resource(buildings);

    // --- Pass-through state ---
    world.insert_resource(QuestLog {
        quests: save
            .quests
            .iter()
            .map(|q| QuestEntry {
                id: q.id.clone(),
                progress: q.progress,
                completed: q.completed,
                claimed: q.claimed,
            })
            .collect(),
    });
    world.insert_resource(GameSettings {
        music: save.settings.music,
        sound: save.settings.sound,
        language: save.settings.language.clone(),
    });
    world.insert_resource(WorldState {
        seed: save.world.seed,
        visited_chunks: save.world.visited_chunks.clone(),
    });
    world.insert_resource(PortalStage(save.portal_stage));

    // Any welcome-back report belongs to the run being replaced.
    world.insert_resource(PendingOfflineReport::default());
}
