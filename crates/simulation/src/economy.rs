//! Resource ledger and the core economy operations.
//!
//! The ledger maps resource ids to non-negative quantities. Mutations are
//! all-or-nothing: a spend that cannot be covered fails without touching the
//! ledger, and an unknown resource id is rejected outright.
//!
//! `add_resource` is the single place gain multipliers apply, in a fixed,
//! documented order: `amount *= 2` while VIP is active, then
//! `amount *= prestige_multiplier`. The order matters once amounts are
//! rounded downstream, so it is part of the contract, not an implementation
//! detail.

use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::player::PlayerState;
use crate::stats::GameStats;
use crate::DirtyState;

// =============================================================================
// Resource catalog
// =============================================================================

/// Every resource the economy knows about. Mutation operations reject ids
/// outside this catalog; unknown keys loaded from a save stay in the ledger
/// but are inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Wood,
    Stone,
    Food,
    IronOre,
    Coal,
    IronIngot,
    Plank,
    Steel,
    Crystal,
}

impl ResourceKind {
    /// All resource kinds, useful for iteration.
    pub const ALL: &'static [ResourceKind] = &[
        Self::Wood,
        Self::Stone,
        Self::Food,
        Self::IronOre,
        Self::Coal,
        Self::IronIngot,
        Self::Plank,
        Self::Steel,
        Self::Crystal,
    ];

    /// Stable id used in saves and by the embedding UI.
    pub fn id(self) -> &'static str {
        match self {
            Self::Wood => "wood",
            Self::Stone => "stone",
            Self::Food => "food",
            Self::IronOre => "iron_ore",
            Self::Coal => "coal",
            Self::IronIngot => "iron_ingot",
            Self::Plank => "plank",
            Self::Steel => "steel",
            Self::Crystal => "crystal",
        }
    }

    /// Reverse lookup; `None` for unknown ids.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.id() == id)
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Wood => "Wood",
            Self::Stone => "Stone",
            Self::Food => "Food",
            Self::IronOre => "Iron Ore",
            Self::Coal => "Coal",
            Self::IronIngot => "Iron Ingot",
            Self::Plank => "Plank",
            Self::Steel => "Steel",
            Self::Crystal => "Crystal",
        }
    }
}

// =============================================================================
// Ledger
// =============================================================================

/// Current stock of every resource, keyed by resource id.
///
/// Quantities are `f64` and never negative. Resources are uncapped.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceLedger {
    amounts: BTreeMap<String, f64>,
}

impl ResourceLedger {
    /// Current stock for a resource id (0 for anything never credited).
    pub fn amount(&self, id: &str) -> f64 {
        self.amounts.get(id).copied().unwrap_or(0.0)
    }

    /// Stock for a catalog kind.
    pub fn amount_of(&self, kind: ResourceKind) -> f64 {
        self.amount(kind.id())
    }

    /// Credits raw units with no multipliers and no stat tracking.
    /// Building production and offline accrual use this path.
    pub fn credit_raw(&mut self, id: &str, amount: f64) {
        if amount <= 0.0 {
            return;
        }
        *self.amounts.entry(id.to_string()).or_insert(0.0) += amount;
    }

    /// Debits raw units, clamped at zero. Callers check affordability first;
    /// the clamp only guards against float drift.
    pub fn debit_raw(&mut self, id: &str, amount: f64) {
        if amount <= 0.0 {
            return;
        }
        let current = self.amount(id);
        self.amounts
            .insert(id.to_string(), (current - amount).max(0.0));
    }

    /// Iterate over (id, amount) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.amounts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Replace the whole ledger (used by save restore).
    pub fn set_amounts(&mut self, amounts: BTreeMap<String, f64>) {
        self.amounts = amounts;
    }

    /// Clone of the underlying map (used by save snapshot).
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        self.amounts.clone()
    }
}

// =============================================================================
// Operations
// =============================================================================

/// Adds a resource gain, applying VIP then prestige multipliers.
///
/// Returns `false` (and mutates nothing) for an unknown resource id or a
/// non-positive amount. The post-multiplier amount is accumulated into
/// `stats.total_resources_gathered`.
pub fn add_resource(
    ledger: &mut ResourceLedger,
    player: &PlayerState,
    stats: &mut GameStats,
    dirty: &mut DirtyState,
    id: &str,
    amount: f64,
    now_ms: u64,
) -> bool {
    if ResourceKind::from_id(id).is_none() {
        warn!("add_resource: unknown resource id '{id}'");
        return false;
    }
    if amount <= 0.0 {
        return false;
    }

    // Fixed multiplier order: VIP doubling first, prestige second.
    let mut amount = amount;
    if player.vip_active(now_ms) {
        amount *= 2.0;
    }
    amount *= player.prestige_multiplier;

    ledger.credit_raw(id, amount);
    stats.total_resources_gathered += amount;
    dirty.mark();
    true
}

/// Spends a resource. Atomic check-then-subtract: returns `false` and leaves
/// the ledger untouched when stock is insufficient or the id is unknown.
pub fn use_resource(
    ledger: &mut ResourceLedger,
    dirty: &mut DirtyState,
    id: &str,
    amount: f64,
) -> bool {
    if ResourceKind::from_id(id).is_none() {
        warn!("use_resource: unknown resource id '{id}'");
        return false;
    }
    if amount <= 0.0 {
        return false;
    }
    let current = ledger.amount(id);
    if current < amount {
        return false;
    }
    ledger
        .amounts
        .insert(id.to_string(), current - amount);
    dirty.mark();
    true
}

/// Checks that every (kind, amount) cost is affordable, then spends them all.
/// All-or-nothing: nothing is deducted unless the full list is covered.
pub fn spend_costs(
    ledger: &mut ResourceLedger,
    dirty: &mut DirtyState,
    costs: &[(ResourceKind, f64)],
) -> bool {
    for (kind, amount) in costs {
        if ledger.amount_of(*kind) < *amount {
            return false;
        }
    }
    for (kind, amount) in costs {
        use_resource(ledger, dirty, kind.id(), *amount);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> (ResourceLedger, PlayerState, GameStats, DirtyState) {
        (
            ResourceLedger::default(),
            PlayerState::default(),
            GameStats::default(),
            DirtyState::default(),
        )
    }

    #[test]
    fn test_resource_id_roundtrip() {
        for kind in ResourceKind::ALL {
            assert_eq!(ResourceKind::from_id(kind.id()), Some(*kind));
        }
        assert_eq!(ResourceKind::from_id("unobtainium"), None);
    }

    #[test]
    fn test_add_resource_rejects_unknown_id() {
        let (mut ledger, player, mut stats, mut dirty) = fixtures();
        assert!(!add_resource(
            &mut ledger, &player, &mut stats, &mut dirty, "unobtainium", 5.0, 0
        ));
        assert_eq!(stats.total_resources_gathered, 0.0);
        assert!(!dirty.dirty);
    }

    #[test]
    fn test_add_resource_plain() {
        let (mut ledger, player, mut stats, mut dirty) = fixtures();
        assert!(add_resource(
            &mut ledger, &player, &mut stats, &mut dirty, "wood", 10.0, 0
        ));
        assert_eq!(ledger.amount("wood"), 10.0);
        assert_eq!(stats.total_resources_gathered, 10.0);
        assert!(dirty.dirty);
    }

    #[test]
    fn test_multiplier_order_vip_then_prestige() {
        let (mut ledger, mut player, mut stats, mut dirty) = fixtures();
        player.vip_status = true;
        player.vip_expires_ms = 10_000;
        player.prestige_multiplier = 2.0;
        // 10 * 2 (VIP) * 2 (prestige) = 40
        assert!(add_resource(
            &mut ledger, &player, &mut stats, &mut dirty, "wood", 10.0, 5_000
        ));
        assert_eq!(ledger.amount("wood"), 40.0);
        assert_eq!(stats.total_resources_gathered, 40.0);
    }

    #[test]
    fn test_expired_vip_does_not_double() {
        let (mut ledger, mut player, mut stats, mut dirty) = fixtures();
        player.vip_status = true;
        player.vip_expires_ms = 1_000;
        assert!(add_resource(
            &mut ledger, &player, &mut stats, &mut dirty, "wood", 10.0, 2_000
        ));
        assert_eq!(ledger.amount("wood"), 10.0);
    }

    #[test]
    fn test_use_resource_insufficient_is_noop() {
        let (mut ledger, player, mut stats, mut dirty) = fixtures();
        add_resource(&mut ledger, &player, &mut stats, &mut dirty, "stone", 5.0, 0);
        assert!(!use_resource(&mut ledger, &mut dirty, "stone", 6.0));
        assert_eq!(ledger.amount("stone"), 5.0);
    }

    #[test]
    fn test_use_resource_exact() {
        let (mut ledger, player, mut stats, mut dirty) = fixtures();
        add_resource(&mut ledger, &player, &mut stats, &mut dirty, "stone", 5.0, 0);
        assert!(use_resource(&mut ledger, &mut dirty, "stone", 5.0));
        assert_eq!(ledger.amount("stone"), 0.0);
    }

    #[test]
    fn test_non_negativity_over_mixed_sequence() {
        let (mut ledger, player, mut stats, mut dirty) = fixtures();
        let ops: &[(bool, f64)] = &[
            (true, 3.0),
            (false, 5.0),
            (true, 4.0),
            (false, 7.0),
            (false, 6.0),
            (true, 1.0),
        ];
        for (is_add, amount) in ops {
            if *is_add {
                add_resource(&mut ledger, &player, &mut stats, &mut dirty, "food", *amount, 0);
            } else {
                use_resource(&mut ledger, &mut dirty, "food", *amount);
            }
            assert!(ledger.amount("food") >= 0.0);
        }
        // 3 + 4 - 7 + 1 = 1 (the 5.0 and 6.0 spends were rejected)
        assert_eq!(ledger.amount("food"), 1.0);
    }

    #[test]
    fn test_spend_costs_all_or_nothing() {
        let (mut ledger, player, mut stats, mut dirty) = fixtures();
        add_resource(&mut ledger, &player, &mut stats, &mut dirty, "wood", 10.0, 0);
        add_resource(&mut ledger, &player, &mut stats, &mut dirty, "stone", 2.0, 0);
        let costs = [(ResourceKind::Wood, 5.0), (ResourceKind::Stone, 5.0)];
        assert!(!spend_costs(&mut ledger, &mut dirty, &costs));
        assert_eq!(ledger.amount("wood"), 10.0);
        assert_eq!(ledger.amount("stone"), 2.0);

        let affordable = [(ResourceKind::Wood, 5.0), (ResourceKind::Stone, 2.0)];
        assert!(spend_costs(&mut ledger, &mut dirty, &affordable));
        assert_eq!(ledger.amount("wood"), 5.0);
        assert_eq!(ledger.amount("stone"), 0.0);
    }
}
