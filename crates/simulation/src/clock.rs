//! Wall-clock time as a resource.
//!
//! Every time-derived mechanic (energy regeneration, production accrual, job
//! completion, offline catch-up) reads `WallClock` instead of calling the
//! platform clock directly. The clock is synced once per frame, so a whole
//! schedule pass observes one consistent `now`, and tests pin time by
//! inserting the resource themselves.

use bevy::prelude::*;

/// Timestamps older than this are treated as corrupt (2020-01-01 UTC).
/// No save predates the game; anything earlier is a tampered or garbage
/// timestamp.
pub const EPOCH_FLOOR_MS: u64 = 1_577_836_800_000;

/// Milliseconds since the Unix epoch, as observed at the top of the frame.
#[derive(Resource, Debug, Clone, Copy)]
pub struct WallClock {
    pub now_ms: u64,
}

impl Default for WallClock {
    fn default() -> Self {
        Self { now_ms: now_ms() }
    }
}

/// Current wall time in ms since the Unix epoch.
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Current wall time in ms since the Unix epoch (browser `Date.now()`).
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

/// Syncs `WallClock` from the platform clock. Runs first in the schedule.
pub fn sync_wall_clock(mut clock: ResMut<WallClock>) {
    clock.now_ms = now_ms();
}
