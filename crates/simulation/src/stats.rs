//! Lifetime counters and the daily claim streak.
//!
//! The counters are monotone: nothing subtracts from them, and a prestige
//! reset carries them forward untouched. `daily_streak` is the one field
//! that can move down (a missed day resets it to 1).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::economy::{add_resource, ResourceKind, ResourceLedger};
use crate::player::PlayerState;
use crate::DirtyState;

#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStats {
    /// Post-multiplier sum of every `add_resource` credit.
    pub total_resources_gathered: f64,
    /// Jobs claimed from the processing queue.
    pub total_crafted: u64,
    /// Lifetime XP, never reduced by level-ups.
    pub total_xp: u64,
    /// Consecutive daily claims.
    pub daily_streak: u32,
    pub last_daily_claim_ms: u64,
    /// Stamped on every save; the offline simulator reads it on load.
    pub last_online_time_ms: u64,
    /// Earned by achievements; carried through prestige.
    pub stars: u32,
}

// =============================================================================
// Daily claim streak
// =============================================================================

/// Claims under this gap from the previous one are rejected.
pub const DAILY_MIN_GAP_MS: u64 = 20 * 60 * 60 * 1000;

/// A gap at or beyond this breaks the streak back to 1.
pub const DAILY_MAX_GAP_MS: u64 = 48 * 60 * 60 * 1000;

/// Outcome of a daily claim attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyClaim {
    /// Reward granted; carries the streak it was scaled by.
    Claimed { streak: u32 },
    /// Less than 20 hours since the previous claim.
    TooSoon,
}

/// Attempts the daily claim. The window is `[20h, 48h)` measured from the
/// previous claim: inside it the streak extends, at or past 48h it restarts
/// at 1, under 20h the claim is rejected. The reward scales linearly with
/// the streak and goes through `add_resource`, so VIP and prestige apply.
pub fn claim_daily(
    ledger: &mut ResourceLedger,
    player: &PlayerState,
    stats: &mut GameStats,
    dirty: &mut DirtyState,
    now_ms: u64,
) -> DailyClaim {
    let gap = now_ms.saturating_sub(stats.last_daily_claim_ms);
    if stats.last_daily_claim_ms != 0 && gap < DAILY_MIN_GAP_MS {
        return DailyClaim::TooSoon;
    }
    if stats.last_daily_claim_ms == 0 || gap >= DAILY_MAX_GAP_MS {
        stats.daily_streak = 1;
    } else {
        stats.daily_streak += 1;
    }
    stats.last_daily_claim_ms = now_ms;

    let streak = stats.daily_streak;
    let scale = f64::from(streak);
    for (kind, base) in [
        (ResourceKind::Wood, 50.0),
        (ResourceKind::Stone, 30.0),
        (ResourceKind::Food, 20.0),
    ] {
        add_resource(ledger, player, stats, dirty, kind.id(), base * scale, now_ms);
    }
    info!("daily claim: streak {streak}");
    dirty.mark();
    DailyClaim::Claimed { streak }
}
