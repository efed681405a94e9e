use bevy::prelude::*;

pub mod achievements;
pub mod buildings;
pub mod clock;
pub mod economy;
pub mod inventory;
pub mod meta;
pub mod offline;
pub mod player;
pub mod prestige;
pub mod processing;
pub mod save_load_state;
pub mod skills;
pub mod stats;
pub mod technologies;
pub mod tools;

#[cfg(test)]
pub mod test_harness;

use save_load_state::SaveLoadState;

// ---------------------------------------------------------------------------
// Core resources
// ---------------------------------------------------------------------------

/// Set when any mutation touches persistable state. The save crate's
/// debounce consumes it; nothing in this crate ever clears it.
#[derive(Resource, Debug, Default)]
pub struct DirtyState {
    pub dirty: bool,
}

impl DirtyState {
    pub fn mark(&mut self) {
        self.dirty = true;
    }

    /// Clears the flag, returning whether it was set.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

/// Who is playing. Injected by the embedding shell; defaults to a guest so
/// the engine runs without any account system.
#[derive(Resource, Debug, Clone)]
pub struct PlayerIdentity {
    pub user_id: String,
    pub username: String,
}

impl Default for PlayerIdentity {
    fn default() -> Self {
        Self {
            user_id: "guest".to_string(),
            username: "Guest".to_string(),
        }
    }
}

/// Global tick counter incremented each Update, used for throttling.
#[derive(Resource, Default)]
pub struct TickCounter(pub u64);

/// Shared throttle timer for systems that don't need to run every tick
/// (achievement checks, cached-flag refresh).
#[derive(Resource, Default)]
pub struct SlowTickTimer {
    pub counter: u32,
}

impl SlowTickTimer {
    pub const INTERVAL: u32 = 100;

    pub fn tick(&mut self) {
        self.counter += 1;
    }

    pub fn should_run(&self) -> bool {
        self.counter.is_multiple_of(Self::INTERVAL)
    }
}

pub fn tick_slow_timer(mut timer: ResMut<SlowTickTimer>, mut tick: ResMut<TickCounter>) {
    timer.tick();
    tick.0 += 1;
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<SaveLoadState>();

        app.init_resource::<clock::WallClock>()
            .init_resource::<DirtyState>()
            .init_resource::<PlayerIdentity>()
            .init_resource::<TickCounter>()
            .init_resource::<SlowTickTimer>()
            .init_resource::<player::PlayerState>()
            .init_resource::<economy::ResourceLedger>()
            .init_resource::<stats::GameStats>()
            .init_resource::<inventory::Inventory>()
            .init_resource::<inventory::Equipment>()
            .init_resource::<tools::Tools>()
            .init_resource::<technologies::Technologies>()
            .init_resource::<skills::Skills>()
            .init_resource::<buildings::Buildings>()
            .init_resource::<processing::ProcessingQueue>()
            .init_resource::<achievements::AchievementTracker>()
            .init_resource::<meta::QuestLog>()
            .init_resource::<meta::GameSettings>()
            .init_resource::<meta::WorldState>()
            .init_resource::<prestige::PortalStage>()
            .init_resource::<offline::PendingOfflineReport>();

        // Clock and throttle run first so everything downstream sees one
        // consistent `now` per frame.
        app.add_systems(
            Update,
            (clock::sync_wall_clock, tick_slow_timer).chain(),
        );

        // Gameplay ticks pause while a save/load pipeline owns the world.
        app.add_systems(
            Update,
            (
                player::tick_energy_regen,
                buildings::tick_building_production,
                processing::tick_completed_flags,
                achievements::check_achievements,
            )
                .after(tick_slow_timer)
                .run_if(in_state(SaveLoadState::Idle)),
        );
    }
}
