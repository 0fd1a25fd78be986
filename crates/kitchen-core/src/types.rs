use serde::{Deserialize, Serialize};

use crate::error::ContractError;

// ---------------------------------------------------------------------------
// Observation
// ---------------------------------------------------------------------------

/// Flat f64 vector handed to the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    data: Vec<f64>,
}

impl Observation {
    pub const fn new(data: Vec<f64>) -> Self {
        Self { data }
    }

    pub fn zeros(len: usize) -> Self {
        Self {
            data: vec![0.0; len],
        }
    }

    pub const fn len(&self) -> usize {
        self.data.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }
}

impl std::ops::Index<usize> for Observation {
    type Output = f64;
    fn index(&self, i: usize) -> &f64 {
        &self.data[i]
    }
}

impl From<Vec<f64>> for Observation {
    fn from(data: Vec<f64>) -> Self {
        Self::new(data)
    }
}

// ---------------------------------------------------------------------------
// BoxSpace
// ---------------------------------------------------------------------------

/// Bounded box of continuous values. Follows Gymnasium `Box` conventions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSpace {
    pub low: Vec<f64>,
    pub high: Vec<f64>,
}

impl BoxSpace {
    pub const fn new(low: Vec<f64>, high: Vec<f64>) -> Self {
        Self { low, high }
    }

    /// Box of width `dim` bounded to `[-bound, bound]` on every axis.
    pub fn symmetric(dim: usize, bound: f64) -> Self {
        let bound = bound.abs();
        Self {
            low: vec![-bound; dim],
            high: vec![bound; dim],
        }
    }

    pub const fn dim(&self) -> usize {
        self.low.len()
    }

    pub fn shape(&self) -> Vec<usize> {
        vec![self.low.len()]
    }

    pub fn contains(&self, values: &[f64]) -> bool {
        values.len() == self.low.len()
            && values
                .iter()
                .zip(self.low.iter().zip(self.high.iter()))
                .all(|(v, (l, h))| v >= l && v <= h)
    }

    /// Clip `values` into the box, axis by axis.
    pub fn clip(&self, values: &[f64]) -> Vec<f64> {
        values
            .iter()
            .zip(self.low.iter().zip(self.high.iter()))
            .map(|(v, (l, h))| v.clamp(*l, *h))
            .collect()
    }

    /// Sample uniformly inside the box. Takes `&mut impl Rng` for determinism.
    pub fn sample(&self, rng: &mut impl rand::Rng) -> Vec<f64> {
        self.low
            .iter()
            .zip(self.high.iter())
            .map(|(l, h)| rng.gen_range(*l..=*h))
            .collect()
    }
}

/// Reject actions of the wrong width or containing NaN/Inf.
pub fn validate_action(action: &[f64], expected: usize) -> Result<(), ContractError> {
    if action.len() != expected {
        return Err(ContractError::ActionDimMismatch {
            expected,
            got: action.len(),
        });
    }
    match action.iter().position(|v| !v.is_finite()) {
        Some(dim) => Err(ContractError::ActionNotFinite { dim }),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// RewardBreakdown
// ---------------------------------------------------------------------------

/// Per-step reward components produced by a task's scoring hook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardBreakdown {
    pub true_reward: f64,
    /// Success indicator; non-zero means the task is solved at this step.
    pub bonus: f64,
    #[serde(rename = "r_total")]
    pub total: f64,
}

impl RewardBreakdown {
    pub const ZERO: Self = Self {
        true_reward: 0.0,
        bonus: 0.0,
        total: 0.0,
    };

    /// Whether the bonus marks this step as a success.
    #[allow(clippy::float_cmp)]
    pub fn is_success(&self) -> bool {
        self.bonus != 0.0
    }
}

// ---------------------------------------------------------------------------
// StepResult
// ---------------------------------------------------------------------------

/// Result of `env.step(action)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub observation: Observation,
    pub reward: f64,
    /// Always `false` here; time limits are enforced by an outer wrapper.
    pub done: bool,
    pub info: StepInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepInfo {
    /// Simulation time after the step, in seconds.
    pub time: f64,
    pub score: f64,
    pub rewards: RewardBreakdown,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
