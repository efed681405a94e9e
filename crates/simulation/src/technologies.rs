//! Technology tree. Research is a set-of-unlocked with prerequisites and a
//! one-time resource cost.

use std::collections::BTreeSet;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::economy::{spend_costs, ResourceKind, ResourceLedger};
use crate::DirtyState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TechKind {
    Smelting,
    Carpentry,
    Masonry,
    SteelWorking,
}

impl TechKind {
    pub const ALL: &'static [TechKind] = &[
        Self::Smelting,
        Self::Carpentry,
        Self::Masonry,
        Self::SteelWorking,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::Smelting => "smelting",
            Self::Carpentry => "carpentry",
            Self::Masonry => "masonry",
            Self::SteelWorking => "steel_working",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.id() == id)
    }

    pub fn prerequisites(self) -> &'static [TechKind] {
        match self {
            Self::Smelting | Self::Carpentry | Self::Masonry => &[],
            Self::SteelWorking => &[TechKind::Smelting],
        }
    }

    pub fn cost(self) -> &'static [(ResourceKind, f64)] {
        match self {
            Self::Smelting => &[(ResourceKind::Stone, 100.0), (ResourceKind::Coal, 20.0)],
            Self::Carpentry => &[(ResourceKind::Wood, 150.0)],
            Self::Masonry => &[(ResourceKind::Stone, 150.0), (ResourceKind::Wood, 50.0)],
            Self::SteelWorking => &[
                (ResourceKind::IronIngot, 50.0),
                (ResourceKind::Coal, 100.0),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResearchError {
    AlreadyResearched,
    MissingPrerequisite,
    NoResources,
}

/// Unlocked technologies, persisted as a sorted id list.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Technologies {
    pub unlocked: BTreeSet<String>,
}

impl Technologies {
    pub fn is_unlocked(&self, kind: TechKind) -> bool {
        self.unlocked.contains(kind.id())
    }

    /// Researches a technology: idempotent rejection, prerequisite check,
    /// then the all-or-nothing cost spend.
    pub fn research(
        &mut self,
        kind: TechKind,
        ledger: &mut ResourceLedger,
        dirty: &mut DirtyState,
    ) -> Result<(), ResearchError> {
        if self.is_unlocked(kind) {
            return Err(ResearchError::AlreadyResearched);
        }
        if kind.prerequisites().iter().any(|p| !self.is_unlocked(*p)) {
            return Err(ResearchError::MissingPrerequisite);
        }
        if !spend_costs(ledger, dirty, kind.cost()) {
            return Err(ResearchError::NoResources);
        }
        self.unlocked.insert(kind.id().to_string());
        info!("researched {}", kind.id());
        dirty.mark();
        Ok(())
    }
}
