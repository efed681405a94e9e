//! Processing queue: timed crafting jobs backed by smelter slots.
//!
//! Readiness is never pushed by a timer. Every reader re-derives
//! `now - start >= duration`, so a suspended tab or a skipped tick can delay
//! the moment a job is *observed* ready but never the moment it *is* ready.
//! The `completed` flag on a job is an opportunistic cache for the save
//! document and the embedding UI, refreshed on the slow tick.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::buildings::{BuildingKind, Buildings};
use crate::clock::WallClock;
use crate::economy::{add_resource, use_resource, ResourceKind, ResourceLedger};
use crate::player::PlayerState;
use crate::skills::{SkillKind, Skills};
use crate::stats::GameStats;
use crate::{DirtyState, SlowTickTimer};

// =============================================================================
// Recipe catalog
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecipeKind {
    Charcoal,
    IronIngot,
    SteelBar,
}

impl RecipeKind {
    pub const ALL: &'static [RecipeKind] = &[Self::Charcoal, Self::IronIngot, Self::SteelBar];

    pub fn id(self) -> &'static str {
        match self {
            Self::Charcoal => "charcoal",
            Self::IronIngot => "iron_ingot",
            Self::SteelBar => "steel_bar",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|r| r.id() == id)
    }

    pub fn inputs(self) -> &'static [(ResourceKind, f64)] {
        match self {
            Self::Charcoal => &[(ResourceKind::Wood, 2.0)],
            Self::IronIngot => &[(ResourceKind::IronOre, 2.0), (ResourceKind::Coal, 1.0)],
            Self::SteelBar => &[(ResourceKind::IronIngot, 2.0), (ResourceKind::Coal, 2.0)],
        }
    }

    pub fn outputs(self) -> &'static [(ResourceKind, f64)] {
        match self {
            Self::Charcoal => &[(ResourceKind::Coal, 1.0)],
            Self::IronIngot => &[(ResourceKind::IronIngot, 1.0)],
            Self::SteelBar => &[(ResourceKind::Steel, 1.0)],
        }
    }

    pub fn duration_ms(self) -> u64 {
        match self {
            Self::Charcoal => 10_000,
            Self::IronIngot => 20_000,
            Self::SteelBar => 60_000,
        }
    }

    pub fn xp(self) -> u64 {
        match self {
            Self::Charcoal => 5,
            Self::IronIngot => 10,
            Self::SteelBar => 25,
        }
    }
}

// =============================================================================
// Queue
// =============================================================================

/// A crafting job. Inputs were deducted when it was queued; outputs are paid
/// on claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: u64,
    pub recipe: RecipeKind,
    pub start_time_ms: u64,
    pub duration_ms: u64,
    /// Cached readiness. Advisory only; see module docs.
    pub completed: bool,
}

impl Job {
    pub fn is_ready(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.start_time_ms) >= self.duration_ms
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddJobError {
    UnknownRecipe,
    SlotsFull,
    NoResources,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimError {
    NotFound,
    NotReady,
}

#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingQueue {
    pub jobs: Vec<Job>,
    next_job_id: u64,
}

/// Concurrent job slots granted by smelters. At least one slot always
/// exists, so the queue works before the first smelter.
pub fn slot_capacity(buildings: &Buildings) -> usize {
    (buildings.count_of(BuildingKind::Smelter) as usize * 2).max(1)
}

impl ProcessingQueue {
    /// Jobs still occupying a slot at `now_ms`. Elapsed jobs free their slot
    /// even before they are claimed.
    pub fn active_count(&self, now_ms: u64) -> usize {
        self.jobs.iter().filter(|j| !j.is_ready(now_ms)).count()
    }

    /// Queues a job: slot check, then the atomic input deduction.
    /// A capacity shrink (smelter removed) never evicts queued jobs; it only
    /// blocks new ones until slots free up.
    pub fn add_job(
        &mut self,
        recipe_id: &str,
        buildings: &Buildings,
        ledger: &mut ResourceLedger,
        dirty: &mut DirtyState,
        now_ms: u64,
    ) -> Result<u64, AddJobError> {
        let Some(recipe) = RecipeKind::from_id(recipe_id) else {
            return Err(AddJobError::UnknownRecipe);
        };
        if self.active_count(now_ms) >= slot_capacity(buildings) {
            return Err(AddJobError::SlotsFull);
        }
        for (res, amount) in recipe.inputs() {
            if ledger.amount_of(*res) < *amount {
                return Err(AddJobError::NoResources);
            }
        }
        for (res, amount) in recipe.inputs() {
            use_resource(ledger, dirty, res.id(), *amount);
        }
        self.next_job_id += 1;
        let id = self.next_job_id;
        self.jobs.push(Job {
            id,
            recipe,
            start_time_ms: now_ms,
            duration_ms: recipe.duration_ms(),
            completed: false,
        });
        dirty.mark();
        Ok(id)
    }

    /// Claims a finished job: pays outputs through `add_resource` (VIP and
    /// prestige apply), grants recipe XP and crafting skill XP, and removes
    /// the job. A second claim of the same id is `NotFound`.
    #[allow(clippy::too_many_arguments)]
    pub fn claim(
        &mut self,
        job_id: u64,
        ledger: &mut ResourceLedger,
        player: &mut PlayerState,
        stats: &mut GameStats,
        skills: &mut Skills,
        dirty: &mut DirtyState,
        now_ms: u64,
    ) -> Result<(), ClaimError> {
        let Some(idx) = self.jobs.iter().position(|j| j.id == job_id) else {
            return Err(ClaimError::NotFound);
        };
        if !self.jobs[idx].is_ready(now_ms) {
            return Err(ClaimError::NotReady);
        }
        let job = self.jobs.remove(idx);
        for (res, amount) in job.recipe.outputs() {
            add_resource(ledger, player, stats, dirty, res.id(), *amount, now_ms);
        }
        player.add_xp(stats, job.recipe.xp(), dirty);
        skills.add_xp(SkillKind::Crafting, job.recipe.xp(), dirty);
        stats.total_crafted += 1;
        info!("claimed {} job {job_id}", job.recipe.id());
        dirty.mark();
        Ok(())
    }

    /// Replaces the queue from a loaded save, re-seeding the id counter past
    /// every restored job.
    pub fn set_jobs(&mut self, jobs: Vec<Job>) {
        self.next_job_id = jobs.iter().map(|j| j.id).max().unwrap_or(0);
        self.jobs = jobs;
    }

    /// Refreshes the cached `completed` flags. Returns how many flipped.
    pub fn refresh_completed(&mut self, now_ms: u64) -> usize {
        let mut flipped = 0;
        for job in &mut self.jobs {
            if !job.completed && job.is_ready(now_ms) {
                job.completed = true;
                flipped += 1;
            }
        }
        flipped
    }
}

/// Slow-tick system keeping the cached flags roughly current for saves.
pub fn tick_completed_flags(
    clock: Res<WallClock>,
    slow_timer: Res<SlowTickTimer>,
    mut queue: ResMut<ProcessingQueue>,
    mut dirty: ResMut<DirtyState>,
) {
    if !slow_timer.should_run() {
        return;
    }
    if queue.refresh_completed(clock.now_ms) > 0 {
        dirty.mark();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        queue: ProcessingQueue,
        buildings: Buildings,
        ledger: ResourceLedger,
        player: PlayerState,
        stats: GameStats,
        skills: Skills,
        dirty: DirtyState,
    }

    fn fixture() -> Fixture {
        let mut ledger = ResourceLedger::default();
        for kind in ResourceKind::ALL {
            ledger.credit_raw(kind.id(), 1_000.0);
        }
        Fixture {
            queue: ProcessingQueue::default(),
            buildings: Buildings::default(),
            ledger,
            player: PlayerState::default(),
            stats: GameStats::default(),
            skills: Skills::default(),
            dirty: DirtyState::default(),
        }
    }

    #[test]
    fn test_add_job_deducts_inputs() {
        let mut f = fixture();
        let id = f
            .queue
            .add_job("iron_ingot", &f.buildings, &mut f.ledger, &mut f.dirty, 0)
            .unwrap();
        assert_eq!(f.ledger.amount("iron_ore"), 998.0);
        assert_eq!(f.ledger.amount("coal"), 999.0);
        assert_eq!(f.queue.jobs[0].id, id);
        assert!(!f.queue.jobs[0].completed);
    }

    #[test]
    fn test_unknown_recipe_rejected() {
        let mut f = fixture();
        assert_eq!(
            f.queue
                .add_job("mithril", &f.buildings, &mut f.ledger, &mut f.dirty, 0),
            Err(AddJobError::UnknownRecipe)
        );
    }

    #[test]
    fn test_slots_enforced_at_capacity_two() {
        let mut f = fixture();
        // One smelter grants two slots.
        f.buildings.place(BuildingKind::Smelter, 0, 0, 0, &mut f.dirty);
        f.queue
            .add_job("charcoal", &f.buildings, &mut f.ledger, &mut f.dirty, 0)
            .unwrap();
        f.queue
            .add_job("charcoal", &f.buildings, &mut f.ledger, &mut f.dirty, 0)
            .unwrap();
        assert_eq!(
            f.queue
                .add_job("charcoal", &f.buildings, &mut f.ledger, &mut f.dirty, 0),
            Err(AddJobError::SlotsFull)
        );
    }

    #[test]
    fn test_elapsed_unclaimed_job_frees_slot() {
        let mut f = fixture();
        // Base capacity is 1 with no smelters.
        f.queue
            .add_job("charcoal", &f.buildings, &mut f.ledger, &mut f.dirty, 0)
            .unwrap();
        assert_eq!(
            f.queue
                .add_job("charcoal", &f.buildings, &mut f.ledger, &mut f.dirty, 5_000),
            Err(AddJobError::SlotsFull)
        );
        // At 10s the first job is ready (even unclaimed) and frees its slot.
        assert!(f
            .queue
            .add_job("charcoal", &f.buildings, &mut f.ledger, &mut f.dirty, 10_000)
            .is_ok());
    }

    #[test]
    fn test_no_resources_leaves_queue_unchanged() {
        let mut f = fixture();
        f.ledger = ResourceLedger::default();
        assert_eq!(
            f.queue
                .add_job("charcoal", &f.buildings, &mut f.ledger, &mut f.dirty, 0),
            Err(AddJobError::NoResources)
        );
        assert!(f.queue.jobs.is_empty());
    }

    #[test]
    fn test_claim_lifecycle() {
        let mut f = fixture();
        let id = f
            .queue
            .add_job("charcoal", &f.buildings, &mut f.ledger, &mut f.dirty, 0)
            .unwrap();
        let coal_before = f.ledger.amount("coal");
        // Early claim fails and pays nothing.
        assert_eq!(
            f.queue.claim(
                id,
                &mut f.ledger,
                &mut f.player,
                &mut f.stats,
                &mut f.skills,
                &mut f.dirty,
                9_999
            ),
            Err(ClaimError::NotReady)
        );
        assert_eq!(f.ledger.amount("coal"), coal_before);
        // Late claim pays exactly once.
        assert_eq!(
            f.queue.claim(
                id,
                &mut f.ledger,
                &mut f.player,
                &mut f.stats,
                &mut f.skills,
                &mut f.dirty,
                10_000
            ),
            Ok(())
        );
        assert_eq!(f.ledger.amount("coal"), coal_before + 1.0);
        assert_eq!(f.stats.total_crafted, 1);
        assert_eq!(f.player.xp, 5);
        // Re-claim of a removed job is NotFound.
        assert_eq!(
            f.queue.claim(
                id,
                &mut f.ledger,
                &mut f.player,
                &mut f.stats,
                &mut f.skills,
                &mut f.dirty,
                20_000
            ),
            Err(ClaimError::NotFound)
        );
    }

    #[test]
    fn test_claim_output_inherits_multipliers() {
        let mut f = fixture();
        f.player.prestige_multiplier = 2.0;
        let id = f
            .queue
            .add_job("charcoal", &f.buildings, &mut f.ledger, &mut f.dirty, 0)
            .unwrap();
        let coal_before = f.ledger.amount("coal");
        f.queue
            .claim(
                id,
                &mut f.ledger,
                &mut f.player,
                &mut f.stats,
                &mut f.skills,
                &mut f.dirty,
                10_000,
            )
            .unwrap();
        assert_eq!(f.ledger.amount("coal"), coal_before + 2.0);
    }

    #[test]
    fn test_refresh_completed_flags() {
        let mut f = fixture();
        f.queue
            .add_job("charcoal", &f.buildings, &mut f.ledger, &mut f.dirty, 0)
            .unwrap();
        assert_eq!(f.queue.refresh_completed(5_000), 0);
        assert_eq!(f.queue.refresh_completed(10_000), 1);
        assert!(f.queue.jobs[0].completed);
        assert_eq!(f.queue.refresh_completed(11_000), 0);
    }
}
