//! Debounced autosave trigger.
//!
//! Leading-edge with a trailing coalesce: the first mutation after a quiet
//! period saves immediately; mutations arriving within `QUIESCENCE_MS` of
//! the last write stay marked in `DirtyState` and collapse into exactly one
//! save at the window boundary. State that is not dirty never saves.

use bevy::prelude::*;
use simulation::clock::WallClock;
use simulation::save_load_state::SaveLoadState;
use simulation::DirtyState;

use crate::save_plugin::SaveGameEvent;

/// Minimum spacing between debounced writes.
pub const QUIESCENCE_MS: u64 = 2_000;

/// Timestamp of the last completed save, stamped by the save pipeline.
#[derive(Resource, Debug, Default)]
pub struct SaveDebounce {
    pub last_write_ms: u64,
}

/// Converts a dirty flag into at most one save per quiescence window.
/// Runs every frame; cheap when clean.
pub fn debounced_save_trigger(
    clock: Res<WallClock>,
    mut dirty: ResMut<DirtyState>,
    debounce: Res<SaveDebounce>,
    state: Res<State<SaveLoadState>>,
    mut save_events: EventWriter<SaveGameEvent>,
) {
    if !dirty.dirty {
        return;
    }
    if *state.get() != SaveLoadState::Idle {
        return;
    }
    if clock.now_ms.saturating_sub(debounce.last_write_ms) < QUIESCENCE_MS {
        // Still inside the window; the flag stays set and coalesces.
        return;
    }
    dirty.take();
    save_events.send(SaveGameEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    // The trigger decision, extracted for table-driven testing. The system
    // above is this plus the event plumbing.
    fn should_fire(dirty: bool, idle: bool, now_ms: u64, last_write_ms: u64) -> bool {
        dirty && idle && now_ms.saturating_sub(last_write_ms) >= QUIESCENCE_MS
    }

    #[test]
    fn test_clean_state_never_fires() {
        assert!(!should_fire(false, true, 100_000, 0));
    }

    #[test]
    fn test_first_mutation_fires_immediately() {
        // Quiet for longer than the window: leading edge.
        assert!(should_fire(true, true, 100_000, 0));
    }

    #[test]
    fn test_mutation_inside_window_waits() {
        assert!(!should_fire(true, true, 101_000, 100_000));
        // ...and fires exactly at the boundary.
        assert!(should_fire(true, true, 102_000, 100_000));
    }

    #[test]
    fn test_never_fires_while_pipeline_busy() {
        assert!(!should_fire(true, false, 200_000, 0));
    }
}
