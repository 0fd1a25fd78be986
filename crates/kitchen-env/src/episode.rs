//! Episode bookkeeping.
//!
//! The environment never terminates an episode itself; an outer time-limit
//! wrapper decides when to stop. [`Episode`] only counts what happened since
//! the last reset.

/// Counters for the current episode.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Episode {
    /// Number of steps taken this episode.
    pub step_count: u32,
    /// Total accumulated reward this episode.
    pub total_reward: f64,
    /// Total accumulated score this episode.
    pub total_score: f64,
    /// Seed passed to the last reset, if any.
    pub seed: Option<u64>,
    /// Number of resets since construction.
    pub episode_number: u32,
}

impl Episode {
    /// Start a new episode with an optional seed.
    pub const fn reset(&mut self, seed: Option<u64>) {
        self.step_count = 0;
        self.total_reward = 0.0;
        self.total_score = 0.0;
        self.seed = seed;
        self.episode_number += 1;
    }

    /// Record one step.
    pub fn advance(&mut self, reward: f64, score: f64) {
        self.step_count += 1;
        self.total_reward += reward;
        self.total_score += score;
    }

    /// Mean per-step score, or `None` before the first step.
    pub fn mean_score(&self) -> Option<f64> {
        (self.step_count > 0).then(|| self.total_score / f64::from(self.step_count))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
