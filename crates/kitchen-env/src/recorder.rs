//! In-memory rollout recording.
//!
//! [`RolloutRecorder`] collects the per-step fields offline evaluation reads
//! and emits them as a [`RolloutPath`], the same shape `evaluate_rollouts`
//! consumes.

use kitchen_core::types::StepResult;

use crate::evaluate::{Bonus, RolloutPath};

/// Accumulates one episode's scores and success flags.
#[derive(Debug, Clone, Default)]
pub struct RolloutRecorder {
    score: Vec<f64>,
    bonus: Vec<Bonus>,
}

impl RolloutRecorder {
    pub const fn new() -> Self {
        Self {
            score: Vec::new(),
            bonus: Vec::new(),
        }
    }

    /// Append one step.
    pub fn record(&mut self, step: &StepResult) {
        self.score.push(step.info.score);
        self.bonus.push(Bonus::Value(step.info.rewards.bonus));
    }

    pub fn len(&self) -> usize {
        self.score.len()
    }

    pub fn is_empty(&self) -> bool {
        self.score.is_empty()
    }

    /// Drop everything recorded so far.
    pub fn clear(&mut self) {
        self.score.clear();
        self.bonus.clear();
    }

    /// Hand out the recorded path and start over.
    pub fn finish(&mut self) -> RolloutPath {
        RolloutPath::new(
            std::mem::take(&mut self.score),
            std::mem::take(&mut self.bonus),
        )
    }
}
