//! Prestige ("the portal"): a wholesale reset that trades the current run
//! for a permanent gain multiplier.
//!
//! The carry-forward list is explicit and everything off it re-defaults:
//! portal stage, prestige multiplier and level, achievements, stars and the
//! other lifetime counters, settings, and VIP status survive. Resources,
//! inventory, equipment, tools, technologies, skills, buildings, the
//! processing queue, quests, and the world do not.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::buildings::Buildings;
use crate::clock::WallClock;
use crate::inventory::{Equipment, Inventory};
use crate::meta::{QuestLog, WorldState};
use crate::offline::PendingOfflineReport;
use crate::player::PlayerState;
use crate::processing::ProcessingQueue;
use crate::skills::Skills;
use crate::stats::GameStats;
use crate::technologies::Technologies;
use crate::tools::Tools;
use crate::DirtyState;

pub const PORTAL_MIN_LEVEL: u32 = 25;

/// Permanent multiplier gained per portal entry.
pub const PRESTIGE_STEP: f64 = 0.5;

/// How many times the portal has been entered.
#[derive(Resource, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PortalStage(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalError {
    LevelTooLow,
}

/// Enters the portal. Exclusive over the world because it replaces most of
/// the game state in one step.
///
/// Returns the new portal stage.
pub fn enter_portal(world: &mut World) -> Result<u32, PortalError> {
    let now_ms = world.resource::<WallClock>().now_ms;
    let player = world.resource::<PlayerState>();
    if player.level < PORTAL_MIN_LEVEL {
        return Err(PortalError::LevelTooLow);
    }

    let mut fresh = PlayerState {
        vip_status: player.vip_status,
        vip_expires_ms: player.vip_expires_ms,
        prestige_multiplier: player.prestige_multiplier + PRESTIGE_STEP,
        prestige_level: player.prestige_level + 1,
        ..PlayerState::default()
    };
    fresh.last_energy_update_ms = now_ms;
    world.insert_resource(fresh);

    world.insert_resource(crate::economy::ResourceLedger::default());
    world.insert_resource(Inventory::default());
    world.insert_resource(Equipment::default());
    world.insert_resource(Tools::default());
    world.insert_resource(Technologies::default());
    world.insert_resource(Skills::default());
    world.insert_resource(Buildings::default());
    world.insert_resource(ProcessingQueue::default());
    world.insert_resource(QuestLog::default());
    world.insert_resource(WorldState::default());
    world.insert_resource(PendingOfflineReport::default());

    // Lifetime counters stay; the absence clock restarts with the run.
    world.resource_mut::<GameStats>().last_online_time_ms = now_ms;

    let mut stage = world.resource_mut::<PortalStage>();
    stage.0 += 1;
    let stage = stage.0;

    world.resource_mut::<DirtyState>().mark();
    info!("entered portal: stage {stage}");
    Ok(stage)
}
