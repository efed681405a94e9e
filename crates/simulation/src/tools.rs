//! Tool levels and upgrades. Tools scale manual gathering in the embedding
//! shell; this core owns their levels and the upgrade economics.

use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::economy::{spend_costs, ResourceKind, ResourceLedger};
use crate::DirtyState;

pub const TOOL_MAX_LEVEL: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Axe,
    Pickaxe,
    Sickle,
}

impl ToolKind {
    pub const ALL: &'static [ToolKind] = &[Self::Axe, Self::Pickaxe, Self::Sickle];

    pub fn id(self) -> &'static str {
        match self {
            Self::Axe => "axe",
            Self::Pickaxe => "pickaxe",
            Self::Sickle => "sickle",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.id() == id)
    }

    /// Base upgrade cost; the actual cost scales linearly with the current
    /// level, so level 1 -> 2 costs exactly this.
    fn base_cost(self) -> &'static [(ResourceKind, f64)] {
        match self {
            Self::Axe => &[(ResourceKind::Wood, 50.0), (ResourceKind::IronIngot, 5.0)],
            Self::Pickaxe => &[(ResourceKind::Stone, 50.0), (ResourceKind::IronIngot, 5.0)],
            Self::Sickle => &[(ResourceKind::Wood, 30.0), (ResourceKind::Food, 20.0)],
        }
    }

    /// Cost to go from `level` to `level + 1`.
    pub fn upgrade_cost(self, level: u32) -> Vec<(ResourceKind, f64)> {
        let scale = f64::from(level);
        self.base_cost()
            .iter()
            .map(|(kind, amount)| (*kind, amount * scale))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeToolError {
    MaxLevel,
    NoResources,
}

/// Tool levels, keyed by tool id. Every tool starts at level 1.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct Tools {
    pub levels: BTreeMap<String, u32>,
}

impl Default for Tools {
    fn default() -> Self {
        let levels = ToolKind::ALL
            .iter()
            .map(|t| (t.id().to_string(), 1))
            .collect();
        Self { levels }
    }
}

impl Tools {
    pub fn level(&self, kind: ToolKind) -> u32 {
        self.levels.get(kind.id()).copied().unwrap_or(1)
    }

    /// Upgrades one tool by one level, spending the scaled cost
    /// all-or-nothing.
    pub fn upgrade(
        &mut self,
        kind: ToolKind,
        ledger: &mut ResourceLedger,
        dirty: &mut DirtyState,
    ) -> Result<u32, UpgradeToolError> {
        let level = self.level(kind);
        if level >= TOOL_MAX_LEVEL {
            return Err(UpgradeToolError::MaxLevel);
        }
        let cost = kind.upgrade_cost(level);
        if !spend_costs(ledger, dirty, &cost) {
            return Err(UpgradeToolError::NoResources);
        }
        let next = level + 1;
        self.levels.insert(kind.id().to_string(), next);
        info!("upgraded {} to level {next}", kind.id());
        dirty.mark();
        Ok(next)
    }
}
