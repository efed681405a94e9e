//! Player progression: level, XP, energy, VIP and prestige multipliers.
//!
//! Energy regenerates lazily. Nothing ticks it; `tick_energy_regen` (and any
//! read site that cares) settles whole 30-second units since the last update
//! timestamp, so a save/load or an offline gap produces exactly the same
//! energy as staying online would have.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::clock::WallClock;
use crate::stats::GameStats;
use crate::DirtyState;

/// One energy point per this many milliseconds.
pub const ENERGY_REGEN_INTERVAL_MS: u64 = 30_000;

/// Starting energy pool. Grows by 10 per level.
pub const BASE_MAX_ENERGY: u32 = 100;

/// XP required to go from `level` to `level + 1`: floor(100 * 1.5^(level-1)).
pub fn xp_threshold(level: u32) -> u64 {
    (100.0 * 1.5_f64.powi(level.saturating_sub(1) as i32)).floor() as u64
}

/// The player's core progression state.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub level: u32,
    /// XP toward the next level. Always below `xp_threshold(level)`.
    pub xp: u64,
    pub energy: u32,
    pub max_energy: u32,
    /// Timestamp the energy pool was last settled at.
    pub last_energy_update_ms: u64,
    pub vip_status: bool,
    pub vip_expires_ms: u64,
    pub prestige_multiplier: f64,
    pub prestige_level: u32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            level: 1,
            xp: 0,
            energy: BASE_MAX_ENERGY,
            max_energy: BASE_MAX_ENERGY,
            last_energy_update_ms: 0,
            vip_status: false,
            vip_expires_ms: 0,
            prestige_multiplier: 1.0,
            prestige_level: 0,
        }
    }
}

impl PlayerState {
    /// Whether the VIP doubling applies at `now_ms`. The flag alone is not
    /// enough; an expired subscription is inactive even if the flag is stale.
    pub fn vip_active(&self, now_ms: u64) -> bool {
        self.vip_status && now_ms < self.vip_expires_ms
    }

    /// Grants XP and applies any level-ups. Each level adds 10 max energy and
    /// refills the pool. Multiple thresholds can be crossed by one grant.
    /// Lifetime XP accrues into `stats.total_xp` and is never reduced.
    ///
    /// Returns the number of levels gained.
    pub fn add_xp(&mut self, stats: &mut GameStats, amount: u64, dirty: &mut DirtyState) -> u32 {
        if amount == 0 {
            return 0;
        }
        self.xp += amount;
        stats.total_xp += amount;
        let mut levels_gained = 0;
        while self.xp >= xp_threshold(self.level) {
            self.xp -= xp_threshold(self.level);
            self.level += 1;
            self.max_energy += 10;
            self.energy = self.max_energy;
            levels_gained += 1;
        }
        if levels_gained > 0 {
            info!(
                "level up: now level {} (max energy {})",
                self.level, self.max_energy
            );
        }
        dirty.mark();
        levels_gained
    }

    /// Spends energy. Atomic: fails without deducting when short. Settles
    /// pending regen first so the player is never undercharged a spend that
    /// elapsed time would have covered.
    pub fn use_energy(&mut self, amount: u32, now_ms: u64, dirty: &mut DirtyState) -> bool {
        self.settle_energy(now_ms);
        if self.energy < amount {
            return false;
        }
        self.energy -= amount;
        self.last_energy_update_ms = now_ms;
        dirty.mark();
        true
    }

    /// Restores energy, clamped to the pool maximum.
    pub fn restore_energy(&mut self, amount: u32, now_ms: u64, dirty: &mut DirtyState) {
        self.settle_energy(now_ms);
        self.energy = (self.energy + amount).min(self.max_energy);
        self.last_energy_update_ms = now_ms;
        dirty.mark();
    }

    /// Settles lazy regeneration up to `now_ms`. Only whole 30-second units
    /// convert to energy; the remainder stays banked in the timestamp. At max
    /// energy the timestamp snaps to now so no credit accrues while full.
    pub fn settle_energy(&mut self, now_ms: u64) {
        if self.energy >= self.max_energy {
            self.last_energy_update_ms = now_ms;
            return;
        }
        let elapsed = now_ms.saturating_sub(self.last_energy_update_ms);
        let units = elapsed / ENERGY_REGEN_INTERVAL_MS;
        if units == 0 {
            return;
        }
        let gained = units.min(u64::from(self.max_energy - self.energy)) as u32;
        self.energy += gained;
        if self.energy >= self.max_energy {
            self.last_energy_update_ms = now_ms;
        } else {
            self.last_energy_update_ms += units * ENERGY_REGEN_INTERVAL_MS;
        }
    }
}

/// Periodic energy settle so the pool is fresh even without explicit spends.
pub fn tick_energy_regen(
    clock: Res<WallClock>,
    mut player: ResMut<PlayerState>,
    mut dirty: ResMut<DirtyState>,
) {
    let before = player.energy;
    player.settle_energy(clock.now_ms);
    if player.energy != before {
        dirty.mark();
    }
}
