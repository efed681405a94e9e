//! Achievements: threshold checks over the lifetime counters.
//!
//! Conditions are evaluated on the slow tick, not on every mutation, so a
//! burst of gathering unlocks at most one slow-tick later. Unlocks grant
//! stars and are persisted as an id list; they survive prestige.

use std::collections::BTreeSet;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::stats::GameStats;
use crate::DirtyState;
use crate::SlowTickTimer;

// =============================================================================
// Achievement Definition
// =============================================================================

/// All achievements a player can unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Achievement {
    // Gathering milestones
    FirstHaul,
    Hoarder,
    Magnate,

    // Crafting milestones
    Apprentice,
    Artisan,
    MasterSmith,

    // Experience milestones
    Seasoned,
    Veteran,

    // Dedication
    WeekStreak,
    MonthStreak,
}

impl Achievement {
    /// All achievement variants for iteration.
    pub const ALL: &'static [Achievement] = &[
        Achievement::FirstHaul,
        Achievement::Hoarder,
        Achievement::Magnate,
        Achievement::Apprentice,
        Achievement::Artisan,
        Achievement::MasterSmith,
        Achievement::Seasoned,
        Achievement::Veteran,
        Achievement::WeekStreak,
        Achievement::MonthStreak,
    ];

    /// Stable id used in saves.
    pub fn id(self) -> &'static str {
        match self {
            Achievement::FirstHaul => "first_haul",
            Achievement::Hoarder => "hoarder",
            Achievement::Magnate => "magnate",
            Achievement::Apprentice => "apprentice",
            Achievement::Artisan => "artisan",
            Achievement::MasterSmith => "master_smith",
            Achievement::Seasoned => "seasoned",
            Achievement::Veteran => "veteran",
            Achievement::WeekStreak => "week_streak",
            Achievement::MonthStreak => "month_streak",
        }
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Achievement::FirstHaul => "First Haul",
            Achievement::Hoarder => "Hoarder",
            Achievement::Magnate => "Resource Magnate",
            Achievement::Apprentice => "Apprentice",
            Achievement::Artisan => "Artisan",
            Achievement::MasterSmith => "Master Smith",
            Achievement::Seasoned => "Seasoned",
            Achievement::Veteran => "Veteran",
            Achievement::WeekStreak => "A Full Week",
            Achievement::MonthStreak => "A Full Month",
        }
    }

    /// Description of what the player must do.
    pub fn description(self) -> &'static str {
        match self {
            Achievement::FirstHaul => "Gather 100 resources",
            Achievement::Hoarder => "Gather 10,000 resources",
            Achievement::Magnate => "Gather 1,000,000 resources",
            Achievement::Apprentice => "Claim 10 crafted items",
            Achievement::Artisan => "Claim 100 crafted items",
            Achievement::MasterSmith => "Claim 1,000 crafted items",
            Achievement::Seasoned => "Earn 1,000 lifetime XP",
            Achievement::Veteran => "Earn 100,000 lifetime XP",
            Achievement::WeekStreak => "Claim the daily reward 7 days running",
            Achievement::MonthStreak => "Claim the daily reward 30 days running",
        }
    }

    /// Stars granted on unlock.
    pub fn stars(self) -> u32 {
        match self {
            Achievement::FirstHaul | Achievement::Apprentice | Achievement::Seasoned => 1,
            Achievement::Hoarder | Achievement::Artisan | Achievement::WeekStreak => 2,
            Achievement::Magnate
            | Achievement::MasterSmith
            | Achievement::Veteran
            | Achievement::MonthStreak => 3,
        }
    }

    /// Whether the condition holds for the given counters.
    pub fn is_met(self, stats: &GameStats) -> bool {
        match self {
            Achievement::FirstHaul => stats.total_resources_gathered >= 100.0,
            Achievement::Hoarder => stats.total_resources_gathered >= 10_000.0,
            Achievement::Magnate => stats.total_resources_gathered >= 1_000_000.0,
            Achievement::Apprentice => stats.total_crafted >= 10,
            Achievement::Artisan => stats.total_crafted >= 100,
            Achievement::MasterSmith => stats.total_crafted >= 1_000,
            Achievement::Seasoned => stats.total_xp >= 1_000,
            Achievement::Veteran => stats.total_xp >= 100_000,
            Achievement::WeekStreak => stats.daily_streak >= 7,
            Achievement::MonthStreak => stats.daily_streak >= 30,
        }
    }
}

// =============================================================================
// Tracker
// =============================================================================

/// Unlocked achievements, persisted as a sorted id list.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct AchievementTracker {
    pub unlocked: BTreeSet<String>,
}

impl AchievementTracker {
    pub fn is_unlocked(&self, achievement: Achievement) -> bool {
        self.unlocked.contains(achievement.id())
    }
}

// =============================================================================
// Check Achievements System
// =============================================================================

/// Checks every locked achievement against the counters on the slow tick,
/// granting stars for new unlocks.
pub fn check_achievements(
    slow_timer: Res<SlowTickTimer>,
    mut tracker: ResMut<AchievementTracker>,
    mut stats: ResMut<GameStats>,
    mut dirty: ResMut<DirtyState>,
) {
    if !slow_timer.should_run() {
        return;
    }
    for achievement in Achievement::ALL {
        if tracker.is_unlocked(*achievement) || !achievement.is_met(&stats) {
            continue;
        }
        tracker.unlocked.insert(achievement.id().to_string());
        stats.stars += achievement.stars();
        info!(
            "achievement unlocked: {} (+{} stars)",
            achievement.name(),
            achievement.stars()
        );
        dirty.mark();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let ids: BTreeSet<_> = Achievement::ALL.iter().map(|a| a.id()).collect();
        assert_eq!(ids.len(), Achievement::ALL.len());
    }

    #[test]
    fn test_thresholds() {
        let mut stats = GameStats::default();
        assert!(!Achievement::FirstHaul.is_met(&stats));
        stats.total_resources_gathered = 100.0;
        assert!(Achievement::FirstHaul.is_met(&stats));
        assert!(!Achievement::Hoarder.is_met(&stats));

        stats.total_crafted = 150;
        assert!(Achievement::Artisan.is_met(&stats));
        assert!(!Achievement::MasterSmith.is_met(&stats));

        stats.daily_streak = 7;
        assert!(Achievement::WeekStreak.is_met(&stats));
    }
}
