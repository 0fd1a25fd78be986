//! Goal ownership and resampling.
//!
//! [`GoalManager`] holds the goal vector the observation is conditioned on.
//! Task variants choose how goals change on reset by supplying a
//! [`GoalSampler`].

use kitchen_core::error::ContractError;
use kitchen_core::types::BoxSpace;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ---------------------------------------------------------------------------
// GoalSampler
// ---------------------------------------------------------------------------

/// Chooses the goal for a new episode.
pub trait GoalSampler: Send {
    /// Produce the next goal given the one currently stored.
    fn sample(&mut self, current: &[f64]) -> Vec<f64>;

    /// Human-readable name for this sampler.
    fn name(&self) -> &str;

    /// Restart any internal randomness. The default does nothing.
    fn reseed(&mut self, _seed: u64) {}
}

/// Keeps whatever goal is stored. This is the base task behaviour.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepCurrentGoal;

impl GoalSampler for KeepCurrentGoal {
    fn sample(&mut self, current: &[f64]) -> Vec<f64> {
        current.to_vec()
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "KeepCurrentGoal"
    }
}

/// Draws goals uniformly from a box. Seeded for determinism.
pub struct UniformGoalSampler {
    space: BoxSpace,
    rng: ChaCha8Rng,
}

impl UniformGoalSampler {
    pub fn new(space: BoxSpace, seed: u64) -> Self {
        Self {
            space,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl GoalSampler for UniformGoalSampler {
    fn sample(&mut self, _current: &[f64]) -> Vec<f64> {
        self.space.sample(&mut self.rng)
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "UniformGoalSampler"
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }
}

// ---------------------------------------------------------------------------
// GoalManager
// ---------------------------------------------------------------------------

/// Owns the current goal. Its width never changes after construction.
pub struct GoalManager {
    goal: Vec<f64>,
    sampler: Box<dyn GoalSampler>,
}

impl GoalManager {
    /// Start with an all-zero goal of width `dim`.
    pub fn new(dim: usize, sampler: Box<dyn GoalSampler>) -> Self {
        Self {
            goal: vec![0.0; dim],
            sampler,
        }
    }

    pub fn get(&self) -> &[f64] {
        &self.goal
    }

    pub fn dim(&self) -> usize {
        self.goal.len()
    }

    pub fn sampler_name(&self) -> &str {
        self.sampler.name()
    }

    /// Replace the goal wholesale.
    pub fn set(&mut self, goal: &[f64]) -> Result<(), ContractError> {
        self.check(goal.len())?;
        self.goal.copy_from_slice(goal);
        Ok(())
    }

    /// Ask the sampler for a new goal and store it.
    pub fn resample(&mut self) -> Result<&[f64], ContractError> {
        let next = self.sampler.sample(&self.goal);
        self.check(next.len())?;
        self.goal = next;
        Ok(&self.goal)
    }

    pub fn reseed(&mut self, seed: u64) {
        self.sampler.reseed(seed);
    }

    const fn check(&self, got: usize) -> Result<(), ContractError> {
        if got == self.goal.len() {
            Ok(())
        } else {
            Err(ContractError::GoalDimMismatch {
                expected: self.goal.len(),
                got,
            })
        }
    }
}

impl std::fmt::Debug for GoalManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoalManager")
            .field("goal", &self.goal)
            .field("sampler", &self.sampler.name())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
