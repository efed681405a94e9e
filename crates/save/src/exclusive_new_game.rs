//! New-game and portal pipelines.
//!
//! Both replace the live state wholesale. New-game re-defaults everything;
//! the portal delegates to the simulation's carry-forward reset and forces
//! an immediate save so the reset can't be lost to a crash.

use bevy::prelude::*;
use simulation::achievements::AchievementTracker;
use simulation::buildings::Buildings;
use simulation::clock::now_ms;
use simulation::economy::ResourceLedger;
use simulation::inventory::{Equipment, Inventory};
use simulation::meta::{GameSettings, QuestLog, WorldState};
use simulation::offline::PendingOfflineReport;
use simulation::player::PlayerState;
use simulation::prestige::{enter_portal, PortalStage};
use simulation::processing::ProcessingQueue;
use simulation::save_load_state::SaveLoadState;
use simulation::skills::Skills;
use simulation::stats::GameStats;
use simulation::technologies::Technologies;
use simulation::tools::Tools;
use simulation::DirtyState;

use crate::save_plugin::SaveGameEvent;

/// Resets the entire game to first-run defaults.
pub(crate) fn exclusive_new_game(world: &mut World) {
    let now = now_ms();

    world.insert_resource(PlayerState {
        last_energy_update_ms: now,
        ..PlayerState::default()
    });
    world.insert_resource(ResourceLedger::default());
    world.insert_resource(Inventory::default());
    world.insert_resource(Equipment::default());
    world.insert_resource(Tools::default());
    world.insert_resource(Technologies::default());
    world.insert_resource(Skills::default());
    world.insert_resource(Buildings::default());
    world.insert_resource(ProcessingQueue::default());
    world.insert_resource(AchievementTracker::default());
    world.insert_resource(QuestLog::default());
    world.insert_resource(GameSettings::default());
    world.insert_resource(WorldState::default());
    world.insert_resource(PortalStage::default());
    world.insert_resource(PendingOfflineReport::default());
    world.insert_resource(GameStats {
        last_online_time_ms: now,
        ..GameStats::default()
    });

    world.resource_mut::<DirtyState>().mark();
    info!("new game started");

    world.send_event(SaveGameEvent);
    world
        .resource_mut::<NextState<SaveLoadState>>()
        .set(SaveLoadState::Idle);
}

/// Runs the prestige reset. Entering without the level requirement is a
/// caller bug worth logging, not a crash.
pub(crate) fn exclusive_portal(world: &mut World) {
    match enter_portal(world) {
        Ok(stage) => {
            // Forced save, bypassing the debounce.
            world.send_event(SaveGameEvent);
            info!("portal complete, stage {stage}");
        }
        Err(e) => {
            warn!("portal rejected: {e:?}");
        }
    }
    world
        .resource_mut::<NextState<SaveLoadState>>()
        .set(SaveLoadState::Idle);
}
