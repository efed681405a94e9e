use bevy::app::AppExit;
use bevy::prelude::*;
use simulation::clock::now_ms;
use simulation::save_load_state::SaveLoadState;
use simulation::stats::GameStats;

use crate::backend::SaveStores;
use crate::debounce::{debounced_save_trigger, SaveDebounce};
use crate::leaderboard::{Leaderboard, ScoreSyncState};
use crate::snapshot::collect_save_data;

// ---------------------------------------------------------------------------
// Buffer resources
// ---------------------------------------------------------------------------

/// Holds the raw JSON document fetched from the stores for the exclusive
/// load system to merge and restore.
#[derive(Resource, Default)]
pub(crate) struct PendingLoadDocument(pub(crate) Option<String>);

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Event)]
pub struct SaveGameEvent;

#[derive(Event)]
pub struct LoadGameEvent;

#[derive(Event)]
pub struct NewGameEvent;

#[derive(Event)]
pub struct PortalEvent;

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SaveGameEvent>()
            .add_event::<LoadGameEvent>()
            .add_event::<NewGameEvent>()
            .add_event::<PortalEvent>()
            .init_resource::<PendingLoadDocument>()
            .init_resource::<SaveDebounce>()
            .init_resource::<ScoreSyncState>()
            .init_resource::<Leaderboard>();

        // The embedding shell may inject its own stores (cloud KV, custom
        // paths) before adding the plugin; otherwise wire the platform
        // default with no cloud.
        if !app.world().contains_resource::<SaveStores>() {
            app.insert_resource(default_stores());
        }

        app.add_systems(Startup, request_initial_load);

        app.add_systems(
            Update,
            (
                detect_save_event,
                detect_load_event,
                detect_new_game_event,
                detect_portal_event,
                debounced_save_trigger,
            ),
        );

        // Exclusive pipelines: run on state entry with full world access,
        // then transition back to Idle.
        app.add_systems(
            OnEnter(SaveLoadState::Saving),
            crate::exclusive_save::exclusive_save,
        );
        app.add_systems(
            OnEnter(SaveLoadState::Loading),
            crate::exclusive_load::exclusive_load,
        );
        app.add_systems(
            OnEnter(SaveLoadState::NewGame),
            crate::exclusive_new_game::exclusive_new_game,
        );
        app.add_systems(
            OnEnter(SaveLoadState::Portal),
            crate::exclusive_new_game::exclusive_portal,
        );

        // Page-unload analog: one last local-only write on the way out.
        app.add_systems(Last, teardown_flush);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn default_stores() -> SaveStores {
    SaveStores::new(Box::new(crate::backend::FileBackend::new("saves")), None)
}

#[cfg(target_arch = "wasm32")]
fn default_stores() -> SaveStores {
    SaveStores::new(Box::new(crate::wasm_storage::LocalStorageBackend), None)
}

// ---------------------------------------------------------------------------
// Event detection systems (lightweight, run in Update)
// ---------------------------------------------------------------------------

/// Kicks off the boot load. Resources are already at defaults, so a missing
/// document leaves a playable fresh game.
fn request_initial_load(mut load_events: EventWriter<LoadGameEvent>) {
    load_events.send(LoadGameEvent);
}

/// Detects `SaveGameEvent` and transitions to `Saving` state.
fn detect_save_event(
    mut events: EventReader<SaveGameEvent>,
    mut next_state: ResMut<NextState<SaveLoadState>>,
) {
    if events.read().next().is_some() {
        // Drain remaining events (only process one per frame).
        events.read().for_each(drop);
        next_state.set(SaveLoadState::Saving);
    }
}

/// Detects `LoadGameEvent`, fetches the document from the stores, and
/// transitions to `Loading` state. The fetch happens here so the exclusive
/// system only merges and restores.
fn detect_load_event(
    mut events: EventReader<LoadGameEvent>,
    mut stores: ResMut<SaveStores>,
    mut pending: ResMut<PendingLoadDocument>,
    mut next_state: ResMut<NextState<SaveLoadState>>,
) {
    if events.read().next().is_some() {
        events.read().for_each(drop);
        pending.0 = stores.load();
        next_state.set(SaveLoadState::Loading);
    }
}

/// Detects `NewGameEvent` and transitions to `NewGame` state.
fn detect_new_game_event(
    mut events: EventReader<NewGameEvent>,
    mut next_state: ResMut<NextState<SaveLoadState>>,
) {
    if events.read().next().is_some() {
        events.read().for_each(drop);
        next_state.set(SaveLoadState::NewGame);
    }
}

/// Detects `PortalEvent` and transitions to `Portal` state.
fn detect_portal_event(
    mut events: EventReader<PortalEvent>,
    mut next_state: ResMut<NextState<SaveLoadState>>,
) {
    if events.read().next().is_some() {
        events.read().for_each(drop);
        next_state.set(SaveLoadState::Portal);
    }
}

// ---------------------------------------------------------------------------
// Teardown
// ---------------------------------------------------------------------------

/// Synchronous best-effort flush on exit. Local only: a slow cloud store
/// must not delay shutdown, and the next launch reconciles via cloud-first
/// load anyway. Runs in `Last` and no-ops until an exit has been requested.
fn teardown_flush(world: &mut World) {
    if world.resource::<Events<AppExit>>().is_empty() {
        return;
    }
    let now = now_ms();
    world.resource_mut::<GameStats>().last_online_time_ms = now;
    let data = collect_save_data(world);
    match data.encode() {
        Ok(document) => {
            world.resource_scope(|_world, mut stores: Mut<SaveStores>| {
                stores.teardown_save(&document);
            });
            info!("teardown flush complete");
        }
        Err(e) => error!("teardown flush failed to encode: {e}"),
    }
}
