//! Fixed-slot inventory and the equipment layer on top of it.
//!
//! Capacity is derived, never stored: 20 base slots plus whatever the
//! equipped backpack grants. Equipment bonuses are aggregated on demand into
//! `EquipmentStats` from the equipped map and the item catalog.

use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::DirtyState;

/// Slots the inventory always has, before equipment bonuses.
pub const BASE_INVENTORY_CAPACITY: usize = 20;

// =============================================================================
// Item catalog
// =============================================================================

/// Equipment slots. Serialized by `id()` in the equipped map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EquipSlot {
    Tool,
    Pet,
    Backpack,
    Charm,
}

impl EquipSlot {
    pub const ALL: &'static [EquipSlot] = &[Self::Tool, Self::Pet, Self::Backpack, Self::Charm];

    pub fn id(self) -> &'static str {
        match self {
            Self::Tool => "tool",
            Self::Pet => "pet",
            Self::Backpack => "backpack",
            Self::Charm => "charm",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.id() == id)
    }
}

/// Static definition of an item.
pub struct ItemDef {
    pub id: &'static str,
    pub name: &'static str,
    /// `None` for items that only stack in the inventory.
    pub slot: Option<EquipSlot>,
    pub max_stack: u32,
    /// Extra inventory slots while equipped.
    pub inventory_bonus: usize,
    /// Fractional bonus to gather yields while equipped (0.1 = +10%).
    pub gather_bonus: f64,
    /// Extra max energy while equipped.
    pub max_energy_bonus: u32,
}

/// The item catalog. Ids are stable; saves reference items by id.
pub const ITEM_CATALOG: &[ItemDef] = &[
    ItemDef {
        id: "steel_hatchet",
        name: "Steel Hatchet",
        slot: Some(EquipSlot::Tool),
        max_stack: 1,
        inventory_bonus: 0,
        gather_bonus: 0.15,
        max_energy_bonus: 0,
    },
    ItemDef {
        id: "fox_companion",
        name: "Fox Companion",
        slot: Some(EquipSlot::Pet),
        max_stack: 1,
        inventory_bonus: 0,
        gather_bonus: 0.10,
        max_energy_bonus: 0,
    },
    ItemDef {
        id: "leather_backpack",
        name: "Leather Backpack",
        slot: Some(EquipSlot::Backpack),
        max_stack: 1,
        inventory_bonus: 10,
        gather_bonus: 0.0,
        max_energy_bonus: 0,
    },
    ItemDef {
        id: "iron_backpack",
        name: "Iron-Framed Backpack",
        slot: Some(EquipSlot::Backpack),
        max_stack: 1,
        inventory_bonus: 20,
        gather_bonus: 0.0,
        max_energy_bonus: 0,
    },
    ItemDef {
        id: "ember_charm",
        name: "Ember Charm",
        slot: Some(EquipSlot::Charm),
        max_stack: 1,
        inventory_bonus: 0,
        gather_bonus: 0.0,
        max_energy_bonus: 20,
    },
    ItemDef {
        id: "hearty_stew",
        name: "Hearty Stew",
        slot: None,
        max_stack: 10,
        inventory_bonus: 0,
        gather_bonus: 0.0,
        max_energy_bonus: 0,
    },
];

pub fn item_def(id: &str) -> Option<&'static ItemDef> {
    ITEM_CATALOG.iter().find(|def| def.id == id)
}

// =============================================================================
// Inventory
// =============================================================================

/// One occupied inventory slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item_id: String,
    pub count: u32,
}

/// The player's inventory. Slot order is meaningful to the embedding UI, so
/// the vec is persisted as-is, holes included.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    pub slots: Vec<Option<ItemStack>>,
}

impl Inventory {
    /// Total count of an item across all slots.
    pub fn count_of(&self, item_id: &str) -> u32 {
        self.slots
            .iter()
            .flatten()
            .filter(|s| s.item_id == item_id)
            .map(|s| s.count)
            .sum()
    }

    /// Adds items, filling existing stacks first, then empty or new slots up
    /// to `capacity`. All-or-nothing: returns `false` and leaves the
    /// inventory untouched if the full count does not fit.
    pub fn add_item(
        &mut self,
        item_id: &str,
        count: u32,
        capacity: usize,
        dirty: &mut DirtyState,
    ) -> bool {
        let Some(def) = item_def(item_id) else {
            warn!("add_item: unknown item id '{item_id}'");
            return false;
        };
        if count == 0 {
            return false;
        }

        // Dry run: how much fits in existing stacks and free slots?
        let stack_room: u32 = self
            .slots
            .iter()
            .flatten()
            .filter(|s| s.item_id == item_id)
            .map(|s| def.max_stack - s.count)
            .sum();
        // Capacity caps the number of occupied slots, wherever they sit.
        let occupied = self.slots.iter().flatten().count();
        let free_slots = capacity.saturating_sub(occupied);
        let slot_room = free_slots as u32 * def.max_stack;
        if stack_room + slot_room < count {
            return false;
        }

        let mut remaining = count;
        for slot in self.slots.iter_mut().flatten() {
            if remaining == 0 {
                break;
            }
            if slot.item_id == item_id && slot.count < def.max_stack {
                let take = remaining.min(def.max_stack - slot.count);
                slot.count += take;
                remaining -= take;
            }
        }
        while remaining > 0 {
            let take = remaining.min(def.max_stack);
            let stack = ItemStack {
                item_id: item_id.to_string(),
                count: take,
            };
            match self.slots.iter_mut().position(|s| s.is_none()) {
                Some(idx) => self.slots[idx] = Some(stack),
                None => self.slots.push(Some(stack)),
            }
            remaining -= take;
        }
        dirty.mark();
        true
    }

    /// Removes items across slots, emptying depleted ones. All-or-nothing.
    pub fn remove_item(&mut self, item_id: &str, count: u32, dirty: &mut DirtyState) -> bool {
        if count == 0 || self.count_of(item_id) < count {
            return false;
        }
        let mut remaining = count;
        for slot in self.slots.iter_mut() {
            if remaining == 0 {
                break;
            }
            if let Some(stack) = slot {
                if stack.item_id == item_id {
                    let take = remaining.min(stack.count);
                    stack.count -= take;
                    remaining -= take;
                    if stack.count == 0 {
                        *slot = None;
                    }
                }
            }
        }
        dirty.mark();
        true
    }
}

// =============================================================================
// Equipment
// =============================================================================

/// What is equipped in each slot, keyed by slot id.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct Equipment {
    pub equipped: BTreeMap<String, Option<String>>,
}

impl Default for Equipment {
    fn default() -> Self {
        let equipped = EquipSlot::ALL
            .iter()
            .map(|s| (s.id().to_string(), None))
            .collect();
        Self { equipped }
    }
}

/// Aggregated bonuses from everything currently equipped.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EquipmentStats {
    pub inventory_bonus: usize,
    pub gather_bonus: f64,
    pub max_energy_bonus: u32,
}

impl Equipment {
    /// Sums catalog bonuses over the equipped map. Unknown item ids (from an
    /// old save) contribute nothing.
    pub fn stats(&self) -> EquipmentStats {
        let mut out = EquipmentStats::default();
        for item_id in self.equipped.values().flatten() {
            if let Some(def) = item_def(item_id) {
                out.inventory_bonus += def.inventory_bonus;
                out.gather_bonus += def.gather_bonus;
                out.max_energy_bonus += def.max_energy_bonus;
            }
        }
        out
    }

    /// Derived inventory capacity.
    pub fn inventory_capacity(&self) -> usize {
        BASE_INVENTORY_CAPACITY + self.stats().inventory_bonus
    }

    /// Equips an item from the inventory into its catalog slot. Fails when
    /// the item is not equippable, not owned, or the slot id mismatches.
    /// Whatever was in the slot returns to the inventory.
    pub fn equip(
        &mut self,
        inventory: &mut Inventory,
        item_id: &str,
        dirty: &mut DirtyState,
    ) -> bool {
        let Some(def) = item_def(item_id) else {
            return false;
        };
        let Some(slot) = def.slot else {
            return false;
        };
        if inventory.count_of(item_id) == 0 {
            return false;
        }
        let capacity = self.inventory_capacity();
        if !inventory.remove_item(item_id, 1, dirty) {
            return false;
        }
        let previous = self
            .equipped
            .insert(slot.id().to_string(), Some(item_id.to_string()))
            .flatten();
        if let Some(prev_id) = previous {
            // The freed slot guarantees room for the displaced item.
            inventory.add_item(&prev_id, 1, capacity, dirty);
        }
        dirty.mark();
        true
    }

    /// Moves the item in `slot` back to the inventory. Fails when the slot is
    /// empty or the inventory is full.
    pub fn unequip(
        &mut self,
        inventory: &mut Inventory,
        slot: EquipSlot,
        dirty: &mut DirtyState,
    ) -> bool {
        let Some(Some(item_id)) = self.equipped.get(slot.id()).cloned() else {
            return false;
        };
        // Capacity after removal, so unequipping a backpack can strand its
        // own bonus slots but never fails spuriously for other gear.
        let mut after = self.clone();
        after.equipped.insert(slot.id().to_string(), None);
        let capacity = after.inventory_capacity();
        if !inventory.add_item(&item_id, 1, capacity, dirty) {
            return false;
        }
        self.equipped.insert(slot.id().to_string(), None);
        dirty.mark();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_item_stacks_then_overflows() {
        let mut inv = Inventory::default();
        let mut dirty = DirtyState::default();
        assert!(inv.add_item("hearty_stew", 7, BASE_INVENTORY_CAPACITY, &mut dirty));
        assert!(inv.add_item("hearty_stew", 7, BASE_INVENTORY_CAPACITY, &mut dirty));
        // 14 total: one full stack of 10 plus one of 4.
        assert_eq!(inv.count_of("hearty_stew"), 14);
        assert_eq!(inv.slots.iter().flatten().count(), 2);
    }

    #[test]
    fn test_add_item_rejects_overflow_atomically() {
        let mut inv = Inventory::default();
        let mut dirty = DirtyState::default();
        // Capacity 1: a single stack of 10 fits, 11 does not.
        assert!(!inv.add_item("hearty_stew", 11, 1, &mut dirty));
        assert_eq!(inv.count_of("hearty_stew"), 0);
        assert!(inv.add_item("hearty_stew", 10, 1, &mut dirty));
    }

    #[test]
    fn test_remove_item_across_stacks() {
        let mut inv = Inventory::default();
        let mut dirty = DirtyState::default();
        inv.add_item("hearty_stew", 14, BASE_INVENTORY_CAPACITY, &mut dirty);
        assert!(inv.remove_item("hearty_stew", 12, &mut dirty));
        assert_eq!(inv.count_of("hearty_stew"), 2);
        assert!(!inv.remove_item("hearty_stew", 3, &mut dirty));
        assert_eq!(inv.count_of("hearty_stew"), 2);
    }

    #[test]
    fn test_equip_and_stats_aggregation() {
        let mut inv = Inventory::default();
        let mut equipment = Equipment::default();
        let mut dirty = DirtyState::default();
        inv.add_item("leather_backpack", 1, BASE_INVENTORY_CAPACITY, &mut dirty);
        inv.add_item("ember_charm", 1, BASE_INVENTORY_CAPACITY, &mut dirty);
        assert!(equipment.equip(&mut inv, "leather_backpack", &mut dirty));
        assert!(equipment.equip(&mut inv, "ember_charm", &mut dirty));
        let stats = equipment.stats();
        assert_eq!(stats.inventory_bonus, 10);
        assert_eq!(stats.max_energy_bonus, 20);
        assert_eq!(equipment.inventory_capacity(), 30);
        assert_eq!(inv.count_of("leather_backpack"), 0);
    }

    #[test]
    fn test_equip_swap_returns_previous_item() {
        let mut inv = Inventory::default();
        let mut equipment = Equipment::default();
        let mut dirty = DirtyState::default();
        inv.add_item("leather_backpack", 1, BASE_INVENTORY_CAPACITY, &mut dirty);
        inv.add_item("iron_backpack", 1, BASE_INVENTORY_CAPACITY, &mut dirty);
        equipment.equip(&mut inv, "leather_backpack", &mut dirty);
        assert!(equipment.equip(&mut inv, "iron_backpack", &mut dirty));
        assert_eq!(inv.count_of("leather_backpack"), 1);
        assert_eq!(equipment.stats().inventory_bonus, 20);
    }

    #[test]
    fn test_unequip_requires_room() {
        let mut inv = Inventory::default();
        let mut equipment = Equipment::default();
        let mut dirty = DirtyState::default();
        inv.add_item("fox_companion", 1, BASE_INVENTORY_CAPACITY, &mut dirty);
        equipment.equip(&mut inv, "fox_companion", &mut dirty);
        assert!(equipment.unequip(&mut inv, EquipSlot::Pet, &mut dirty));
        assert_eq!(inv.count_of("fox_companion"), 1);
        assert!(!equipment.unequip(&mut inv, EquipSlot::Pet, &mut dirty));
    }

    #[test]
    fn test_equip_rejects_non_equippable() {
        let mut inv = Inventory::default();
        let mut equipment = Equipment::default();
        let mut dirty = DirtyState::default();
        inv.add_item("hearty_stew", 1, BASE_INVENTORY_CAPACITY, &mut dirty);
        assert!(!equipment.equip(&mut inv, "hearty_stew", &mut dirty));
        assert_eq!(inv.count_of("hearty_stew"), 1);
    }
}
