//! The load pipeline: merge the stored document over defaults, restore the
//! world, then run the offline simulator exactly once.
//!
//! Runs as an exclusive system on `OnEnter(SaveLoadState::Loading)`. There
//! is no failure path that aborts the load: an unreadable or corrupt
//! document degrades to defaults, which is a playable state.

use bevy::prelude::*;
use simulation::buildings::Buildings;
use simulation::clock::{now_ms, WallClock};
use simulation::economy::ResourceLedger;
use simulation::offline::{simulate_offline, PendingOfflineReport};
use simulation::processing::ProcessingQueue;
use simulation::save_load_state::SaveLoadState;
use simulation::stats::GameStats;
use simulation::DirtyState;

use crate::merge::merge_save;
use crate::restore_resources::restore_resources_from_save;
use crate::save_plugin::PendingLoadDocument;
use crate::save_types::SaveData;

pub(crate) fn exclusive_load(world: &mut World) {
    let now = now_ms();
    world.resource_mut::<WallClock>().now_ms = now;

    let document = world.resource_mut::<PendingLoadDocument>().0.take();
    let save = match document {
        Some(json) => merge_save(&json),
        None => {
            info!("no save document found, starting from defaults");
            SaveData::default()
        }
    };

    restore_resources_from_save(world, &save, now);

    // Offline catch-up runs against the freshly restored state.
    let report = world.resource_scope(|world, mut queue: Mut<ProcessingQueue>| {
        world.resource_scope(|world, mut ledger: Mut<ResourceLedger>| {
            world.resource_scope(|world, mut stats: Mut<GameStats>| {
                world.resource_scope(|world, mut dirty: Mut<DirtyState>| {
                    let buildings = world.resource::<Buildings>();
                    simulate_offline(
                        buildings,
                        &mut queue,
                        &mut ledger,
                        &mut stats,
                        &mut dirty,
                        now,
                    )
                })
            })
        })
    });
    if let Some(report) = report {
        world.resource_mut::<PendingOfflineReport>().0 = Some(report);
    }

    info!("load complete (portal stage {})", save.portal_stage);
    world
        .resource_mut::<NextState<SaveLoadState>>()
        .set(SaveLoadState::Idle);
}
