//! Per-step task scoring.
//!
//! Task variants differ only in how they score an observation, so scoring is
//! a trait composed into the environment rather than something the
//! environment is specialised over.

use kitchen_core::error::KitchenError;
use kitchen_core::types::RewardBreakdown;
use serde::{Deserialize, Serialize};

use crate::observation::ObservationDict;

/// Reward components plus the scalar score for one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub rewards: RewardBreakdown,
    pub score: f64,
}

impl ScoreCard {
    pub const ZERO: Self = Self {
        rewards: RewardBreakdown::ZERO,
        score: 0.0,
    };
}

/// Scores an observation for a specific task.
pub trait TaskScoring: Send {
    fn evaluate(&self, obs: &ObservationDict) -> Result<ScoreCard, KitchenError>;

    /// Human-readable name for this task.
    fn name(&self) -> &str;
}

/// Base task with no scoring. Every call fails with
/// [`KitchenError::NotImplemented`]; a concrete task must be supplied.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnimplementedScoring;

impl TaskScoring for UnimplementedScoring {
    fn evaluate(&self, _obs: &ObservationDict) -> Result<ScoreCard, KitchenError> {
        Err(KitchenError::NotImplemented(
            "task scoring: the base kitchen task has no reward; supply a TaskScoring".into(),
        ))
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "Unimplemented"
    }
}

/// The relax task: no objective, everything scores zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelaxScoring;

impl TaskScoring for RelaxScoring {
    fn evaluate(&self, _obs: &ObservationDict) -> Result<ScoreCard, KitchenError> {
        Ok(ScoreCard::ZERO)
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "Relax"
    }
}
