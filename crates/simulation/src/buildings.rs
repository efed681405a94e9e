//! Building catalog and online production.
//!
//! Production is pull-based: the accrual system compares each kind's stamp
//! against the wall clock and settles whole elapsed seconds, so frame rate
//! and tab throttling never change yields. Consumption is all-or-nothing per
//! kind per settlement — a kind that cannot afford its full input window
//! produces nothing and forfeits that window.

use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::clock::WallClock;
use crate::economy::{ResourceKind, ResourceLedger};
use crate::DirtyState;

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildingKind {
    LumberCamp,
    Quarry,
    Farm,
    IronMine,
    CharcoalKiln,
    Sawmill,
    Smelter,
}

impl BuildingKind {
    pub const ALL: &'static [BuildingKind] = &[
        Self::LumberCamp,
        Self::Quarry,
        Self::Farm,
        Self::IronMine,
        Self::CharcoalKiln,
        Self::Sawmill,
        Self::Smelter,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::LumberCamp => "lumber_camp",
            Self::Quarry => "quarry",
            Self::Farm => "farm",
            Self::IronMine => "iron_mine",
            Self::CharcoalKiln => "charcoal_kiln",
            Self::Sawmill => "sawmill",
            Self::Smelter => "smelter",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.id() == id)
    }

    /// Output per building per second. Empty for the smelter, which grants
    /// processing slots instead of passive output.
    pub fn production(self) -> &'static [(ResourceKind, f64)] {
        match self {
            Self::LumberCamp => &[(ResourceKind::Wood, 1.0)],
            Self::Quarry => &[(ResourceKind::Stone, 0.8)],
            Self::Farm => &[(ResourceKind::Food, 0.5)],
            Self::IronMine => &[(ResourceKind::IronOre, 0.4)],
            Self::CharcoalKiln => &[(ResourceKind::Coal, 0.3)],
            Self::Sawmill => &[(ResourceKind::Plank, 0.2)],
            Self::Smelter => &[],
        }
    }

    /// Input per building per second.
    pub fn consumption(self) -> &'static [(ResourceKind, f64)] {
        match self {
            Self::LumberCamp | Self::Quarry | Self::Farm | Self::Smelter => &[],
            Self::IronMine => &[(ResourceKind::Food, 0.1)],
            Self::CharcoalKiln => &[(ResourceKind::Wood, 0.6)],
            Self::Sawmill => &[(ResourceKind::Wood, 0.5)],
        }
    }
}

// =============================================================================
// State
// =============================================================================

/// A building instance on the external map. Placement coordinates belong to
/// the embedding shell; this core only mutates `last_production_ms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedBuilding {
    pub id: u64,
    pub kind: String,
    pub x: i32,
    pub y: i32,
    pub last_production_ms: u64,
}

/// Owned buildings: count per kind plus the placed instances.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Buildings {
    pub counts: BTreeMap<String, u32>,
    pub placed: Vec<PlacedBuilding>,
    /// Per-kind production anchor. Advances by whole settled seconds so the
    /// sub-second remainder stays banked.
    pub last_production_ms: BTreeMap<String, u64>,
    next_placed_id: u64,
}

impl Buildings {
    pub fn count_of(&self, kind: BuildingKind) -> u32 {
        self.counts.get(kind.id()).copied().unwrap_or(0)
    }

    /// Registers a building placed by the embedding shell.
    pub fn place(&mut self, kind: BuildingKind, x: i32, y: i32, now_ms: u64, dirty: &mut DirtyState) -> u64 {
        *self.counts.entry(kind.id().to_string()).or_insert(0) += 1;
        self.last_production_ms
            .entry(kind.id().to_string())
            .or_insert(now_ms);
        self.next_placed_id += 1;
        let id = self.next_placed_id;
        self.placed.push(PlacedBuilding {
            id,
            kind: kind.id().to_string(),
            x,
            y,
            last_production_ms: now_ms,
        });
        dirty.mark();
        id
    }

    /// Replaces the placed list from a loaded save, re-seeding the id
    /// counter past every restored instance.
    pub fn set_placed(&mut self, placed: Vec<PlacedBuilding>) {
        self.next_placed_id = placed.iter().map(|p| p.id).max().unwrap_or(0);
        self.placed = placed;
    }

    /// Removes a placed instance by id. Returns `false` when unknown.
    pub fn remove(&mut self, placed_id: u64, dirty: &mut DirtyState) -> bool {
        let Some(idx) = self.placed.iter().position(|p| p.id == placed_id) else {
            return false;
        };
        let removed = self.placed.swap_remove(idx);
        if let Some(count) = self.counts.get_mut(&removed.kind) {
            *count = count.saturating_sub(1);
        }
        dirty.mark();
        true
    }
}

// =============================================================================
// Accrual
// =============================================================================

/// Settles one kind's production window. Returns the whole seconds settled
/// (0 when under a second has elapsed). On an unaffordable window the stamp
/// still advances: starvation forfeits output, it does not bank it.
pub fn settle_kind(
    buildings: &mut Buildings,
    ledger: &mut ResourceLedger,
    kind: BuildingKind,
    now_ms: u64,
) -> u64 {
    let count = buildings.count_of(kind);
    if count == 0 || kind.production().is_empty() {
        return 0;
    }
    let last = *buildings
        .last_production_ms
        .entry(kind.id().to_string())
        .or_insert(now_ms);
    let secs = now_ms.saturating_sub(last) / 1000;
    if secs == 0 {
        return 0;
    }
    let new_stamp = last + secs * 1000;
    buildings
        .last_production_ms
        .insert(kind.id().to_string(), new_stamp);
    for placed in buildings.placed.iter_mut().filter(|p| p.kind == kind.id()) {
        placed.last_production_ms = new_stamp;
    }

    let window = f64::from(count) * secs as f64;
    let affordable = kind
        .consumption()
        .iter()
        .all(|(res, per_sec)| ledger.amount_of(*res) >= per_sec * window);
    if !affordable {
        return secs;
    }
    for (res, per_sec) in kind.consumption() {
        ledger.debit_raw(res.id(), per_sec * window);
    }
    for (res, per_sec) in kind.production() {
        ledger.credit_raw(res.id(), per_sec * window);
    }
    secs
}

/// Per-frame production system. Whole-second settlement makes this an
/// effective 1 Hz accrual regardless of frame rate.
pub fn tick_building_production(
    clock: Res<WallClock>,
    mut buildings: ResMut<Buildings>,
    mut ledger: ResMut<ResourceLedger>,
    mut dirty: ResMut<DirtyState>,
) {
    let mut settled = false;
    for kind in BuildingKind::ALL {
        if settle_kind(&mut buildings, &mut ledger, *kind, clock.now_ms) > 0 {
            settled = true;
        }
    }
    if settled {
        dirty.mark();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_producer_accrues_whole_seconds() {
        let mut buildings = Buildings::default();
        let mut ledger = ResourceLedger::default();
        let mut dirty = DirtyState::default();
        buildings.place(BuildingKind::LumberCamp, 0, 0, 0, &mut dirty);
        buildings.place(BuildingKind::LumberCamp, 1, 0, 0, &mut dirty);
        // 5.7s elapsed: 5 whole seconds settle, 700ms stays banked.
        assert_eq!(settle_kind(&mut buildings, &mut ledger, BuildingKind::LumberCamp, 5_700), 5);
        assert_eq!(ledger.amount("wood"), 10.0);
        assert_eq!(buildings.last_production_ms["lumber_camp"], 5_000);
        // The banked 700ms completes a second at t=6.0s.
        assert_eq!(settle_kind(&mut buildings, &mut ledger, BuildingKind::LumberCamp, 6_000), 1);
        assert_eq!(ledger.amount("wood"), 12.0);
    }

    #[test]
    fn test_consumer_all_or_nothing() {
        let mut buildings = Buildings::default();
        let mut ledger = ResourceLedger::default();
        let mut dirty = DirtyState::default();
        buildings.place(BuildingKind::Sawmill, 0, 0, 0, &mut dirty);
        // 10s window needs 5 wood; only 4 available, so nothing happens and
        // the window is forfeited.
        ledger.credit_raw("wood", 4.0);
        settle_kind(&mut buildings, &mut ledger, BuildingKind::Sawmill, 10_000);
        assert_eq!(ledger.amount("wood"), 4.0);
        assert_eq!(ledger.amount("plank"), 0.0);
        assert_eq!(buildings.last_production_ms["sawmill"], 10_000);
        // Next 10s window is affordable: consume 5, produce 2.
        ledger.credit_raw("wood", 1.0);
        settle_kind(&mut buildings, &mut ledger, BuildingKind::Sawmill, 20_000);
        assert_eq!(ledger.amount("wood"), 0.0);
        assert_eq!(ledger.amount("plank"), 2.0);
    }

    #[test]
    fn test_placed_entries_stamped() {
        let mut buildings = Buildings::default();
        let mut ledger = ResourceLedger::default();
        let mut dirty = DirtyState::default();
        buildings.place(BuildingKind::Quarry, 3, 4, 0, &mut dirty);
        settle_kind(&mut buildings, &mut ledger, BuildingKind::Quarry, 2_000);
        assert_eq!(buildings.placed[0].last_production_ms, 2_000);
    }

    #[test]
    fn test_smelter_produces_nothing() {
        let mut buildings = Buildings::default();
        let mut ledger = ResourceLedger::default();
        let mut dirty = DirtyState::default();
        buildings.place(BuildingKind::Smelter, 0, 0, 0, &mut dirty);
        assert_eq!(settle_kind(&mut buildings, &mut ledger, BuildingKind::Smelter, 60_000), 0);
    }

    #[test]
    fn test_remove_decrements_count() {
        let mut buildings = Buildings::default();
        let mut dirty = DirtyState::default();
        let id = buildings.place(BuildingKind::Farm, 0, 0, 0, &mut dirty);
        assert_eq!(buildings.count_of(BuildingKind::Farm), 1);
        assert!(buildings.remove(id, &mut dirty));
        assert_eq!(buildings.count_of(BuildingKind::Farm), 0);
        assert!(!buildings.remove(id, &mut dirty));
    }
}
