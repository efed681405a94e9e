//! Offline catch-up. Runs once after a save is loaded and restored.
//!
//! The replay is O(building kinds) + O(queue length), independent of how
//! long the player was away: production accrues arithmetically over the
//! capped window instead of re-simulating ticks, and due jobs are flagged in
//! one pass. Consumption chains are not replayed offline; only kinds with a
//! production table earn, and they earn their gross output.

use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::buildings::{BuildingKind, Buildings};
use crate::clock::EPOCH_FLOOR_MS;
use crate::economy::ResourceLedger;
use crate::processing::ProcessingQueue;
use crate::stats::GameStats;
use crate::DirtyState;

/// Absences under a minute earn nothing (rapid reloads stay quiet).
pub const MIN_OFFLINE_MS: u64 = 60_000;

/// Accrual window cap: 8 hours.
pub const MAX_OFFLINE_MS: u64 = 8 * 60 * 60 * 1000;

/// What the absence earned, for the embedding shell's welcome-back summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineReport {
    /// Resource id -> whole units earned (already applied to the ledger).
    pub earnings: BTreeMap<String, f64>,
    /// Capped length of the absence in seconds.
    pub seconds: u64,
}

/// Holds the report until the shell consumes it (or doubles it first).
#[derive(Resource, Debug, Default)]
pub struct PendingOfflineReport(pub Option<OfflineReport>);

/// Simulates the absence since `stats.last_online_time_ms`.
///
/// A missing, future, or pre-2020 timestamp is treated as corrupt: it heals
/// to now and the absence earns nothing. Earnings are floored to whole units
/// and applied raw — VIP and prestige only apply at `add_resource` call
/// sites, and this is not one.
pub fn simulate_offline(
    buildings: &Buildings,
    queue: &mut ProcessingQueue,
    ledger: &mut ResourceLedger,
    stats: &mut GameStats,
    dirty: &mut DirtyState,
    now_ms: u64,
) -> Option<OfflineReport> {
    let last = stats.last_online_time_ms;
    if last == 0 || last > now_ms || last < EPOCH_FLOOR_MS {
        if last != 0 {
            warn!("corrupt last-online timestamp {last}, resetting to now");
        }
        stats.last_online_time_ms = now_ms;
        dirty.mark();
        return None;
    }

    let elapsed = now_ms - last;
    if elapsed < MIN_OFFLINE_MS {
        stats.last_online_time_ms = now_ms;
        dirty.mark();
        return None;
    }
    let capped_secs = elapsed.min(MAX_OFFLINE_MS) / 1000;

    let mut earnings: BTreeMap<String, f64> = BTreeMap::new();
    for kind in BuildingKind::ALL {
        let count = buildings.count_of(*kind);
        if count == 0 {
            continue;
        }
        for (res, per_sec) in kind.production() {
            let amount = (per_sec * f64::from(count) * capped_secs as f64).floor();
            if amount > 0.0 {
                *earnings.entry(res.id().to_string()).or_insert(0.0) += amount;
            }
        }
    }

    let completed = queue.refresh_completed(now_ms);

    stats.last_online_time_ms = now_ms;
    dirty.mark();
    if earnings.is_empty() && completed == 0 {
        return None;
    }

    for (id, amount) in &earnings {
        ledger.credit_raw(id, *amount);
    }
    info!(
        "offline catch-up: {}s, {} resource kinds, {completed} jobs finished",
        capped_secs,
        earnings.len()
    );
    Some(OfflineReport {
        earnings,
        seconds: capped_secs,
    })
}

/// Doubles the offline earnings: applies the report's amounts one more time,
/// bringing the total to twice the base payout (the "watch an ad" hook).
/// Single-shot; the report is consumed whether or not anything was earned.
pub fn claim_offline_bonus(
    pending: &mut PendingOfflineReport,
    ledger: &mut ResourceLedger,
    dirty: &mut DirtyState,
) -> bool {
    let Some(report) = pending.0.take() else {
        return false;
    };
    for (id, amount) in &report.earnings {
        ledger.credit_raw(id, *amount);
    }
    dirty.mark();
    true
}
