//! The save pipeline. Runs as an exclusive system on
//! `OnEnter(SaveLoadState::Saving)` and always returns the state machine to
//! `Idle`, success or not.

use bevy::prelude::*;
use simulation::clock::now_ms;
use simulation::save_load_state::SaveLoadState;
use simulation::stats::GameStats;

use crate::backend::SaveStores;
use crate::debounce::SaveDebounce;
use crate::leaderboard::maybe_sync_score;
use crate::save_error::SaveError;
use crate::snapshot::collect_save_data;

pub(crate) fn exclusive_save(world: &mut World) {
    if let Err(e) = exclusive_save_inner(world) {
        error!("Save failed: {e}");
    }
    world
        .resource_mut::<NextState<SaveLoadState>>()
        .set(SaveLoadState::Idle);
}

fn exclusive_save_inner(world: &mut World) -> Result<(), SaveError> {
    let now = now_ms();

    // The document must say "the player was online right now" so the next
    // launch measures the absence from this save, not the previous one.
    world.resource_mut::<GameStats>().last_online_time_ms = now;

    let data = collect_save_data(world);
    let document = data.encode()?;

    world.resource_scope(|_world, mut stores: Mut<SaveStores>| {
        stores.save(&document);
    });
    world.resource_mut::<SaveDebounce>().last_write_ms = now;
    // Everything in the document is now persisted.
    world.resource_mut::<simulation::DirtyState>().take();

    maybe_sync_score(world, now);

    debug!("saved {} bytes", document.len());
    Ok(())
}
