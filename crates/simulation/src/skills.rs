//! Per-skill experience. Gathering ops feed the gathering skill, queue
//! claims feed crafting. The curve is the same shape as player levels.

use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::player::xp_threshold;
use crate::DirtyState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkillKind {
    Gathering,
    Crafting,
}

impl SkillKind {
    pub const ALL: &'static [SkillKind] = &[Self::Gathering, Self::Crafting];

    pub fn id(self) -> &'static str {
        match self {
            Self::Gathering => "gathering",
            Self::Crafting => "crafting",
        }
    }
}

/// One skill's progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillProgress {
    pub level: u32,
    pub xp: u64,
}

impl Default for SkillProgress {
    fn default() -> Self {
        Self { level: 1, xp: 0 }
    }
}

/// All skill progressions, keyed by skill id.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct Skills {
    pub progress: BTreeMap<String, SkillProgress>,
}

impl Default for Skills {
    fn default() -> Self {
        let progress = SkillKind::ALL
            .iter()
            .map(|s| (s.id().to_string(), SkillProgress::default()))
            .collect();
        Self { progress }
    }
}

impl Skills {
    pub fn level(&self, kind: SkillKind) -> u32 {
        self.progress.get(kind.id()).map_or(1, |p| p.level)
    }

    /// Grants skill XP, rolling over thresholds like player levels do.
    pub fn add_xp(&mut self, kind: SkillKind, amount: u64, dirty: &mut DirtyState) {
        if amount == 0 {
            return;
        }
        let entry = self
            .progress
            .entry(kind.id().to_string())
            .or_default();
        entry.xp += amount;
        while entry.xp >= xp_threshold(entry.level) {
            entry.xp -= xp_threshold(entry.level);
            entry.level += 1;
            info!("skill {}: level {}", kind.id(), entry.level);
        }
        dirty.mark();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_levels_roll_over() {
        let mut skills = Skills::default();
        let mut dirty = DirtyState::default();
        skills.add_xp(SkillKind::Gathering, 260, &mut dirty);
        assert_eq!(skills.level(SkillKind::Gathering), 3);
        assert_eq!(skills.progress["gathering"].xp, 10);
        // Other skills untouched.
        assert_eq!(skills.level(SkillKind::Crafting), 1);
    }
}
