//! Offline success metric over recorded rollouts.
//!
//! Rollout logs have the shape
//!
//! ```json
//! { "env_infos": { "score": [0.0, 1.0], "rewards": { "bonus": [false, true] } } }
//! ```
//!
//! Bonus entries may be booleans or numbers; any non-zero number is truthy.

use kitchen_core::error::EvaluationError;
use serde::{Deserialize, Serialize};

/// Weight on success percentage; keeps success rate ahead of mean score when
/// results are sorted.
pub const SUCCESS_WEIGHT: f64 = 1e6;

// ---------------------------------------------------------------------------
// Rollout log types
// ---------------------------------------------------------------------------

/// A bool-like success flag as it appears in rollout logs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bonus {
    Flag(bool),
    Value(f64),
}

impl Bonus {
    #[allow(clippy::float_cmp)]
    pub fn is_truthy(self) -> bool {
        match self {
            Self::Flag(b) => b,
            Self::Value(v) => v != 0.0,
        }
    }
}

impl From<bool> for Bonus {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

impl From<f64> for Bonus {
    fn from(v: f64) -> Self {
        Self::Value(v)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardLog {
    #[serde(default)]
    pub bonus: Vec<Bonus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvInfos {
    #[serde(default)]
    pub score: Vec<f64>,
    #[serde(default)]
    pub rewards: RewardLog,
}

/// One recorded episode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RolloutPath {
    pub env_infos: EnvInfos,
}

impl RolloutPath {
    /// Build a path directly from per-step scores and bonuses.
    pub fn new(score: Vec<f64>, bonus: Vec<Bonus>) -> Self {
        Self {
            env_infos: EnvInfos {
                score,
                rewards: RewardLog { bonus },
            },
        }
    }

    /// Mean per-step score, or `None` if no steps were recorded.
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_score(&self) -> Option<f64> {
        let scores = &self.env_infos.score;
        if scores.is_empty() {
            return None;
        }
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }

    /// Whether the final recorded bonus is truthy.
    pub fn succeeded(&self) -> Option<bool> {
        self.env_infos.rewards.bonus.last().map(|b| b.is_truthy())
    }
}

// ---------------------------------------------------------------------------
// evaluate_rollouts
// ---------------------------------------------------------------------------

/// Fuse success rate and mean score into one sortable scalar:
/// `sign(mean) × (1e6 × round(success %, 2) + |mean|)`.
///
/// `mean` is the mean over rollouts of each rollout's mean score. A zero mean
/// yields zero regardless of success.
#[allow(clippy::cast_precision_loss)]
pub fn evaluate_rollouts(paths: &[RolloutPath]) -> Result<f64, EvaluationError> {
    if paths.is_empty() {
        return Err(EvaluationError::EmptyBatch);
    }

    let mut score_sum = 0.0;
    let mut successes = 0usize;
    for (index, path) in paths.iter().enumerate() {
        let mean = path
            .mean_score()
            .ok_or(EvaluationError::EmptyRollout { index })?;
        let succeeded = path
            .succeeded()
            .ok_or(EvaluationError::EmptyRollout { index })?;
        score_sum += mean;
        successes += usize::from(succeeded);
    }

    let n = paths.len() as f64;
    let mean_score = score_sum / n;
    let success_pct = successes as f64 * 100.0 / n;
    Ok(sign(mean_score) * SUCCESS_WEIGHT.mul_add(round2(success_pct), mean_score.abs()))
}

/// Sign with `sign(0) = 0`.
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Round to 2 decimals, ties to even.
fn round2(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn path(score: &[f64], bonus: &[bool]) -> RolloutPath {
        RolloutPath::new(
            score.to_vec(),
            bonus.iter().copied().map(Bonus::from).collect(),
        )
    }

    // ---- evaluate_rollouts ----

    #[test]
    fn single_successful_rollout() {
        let v = evaluate_rollouts(&[path(&[1.0, 1.0], &[false, true])]).unwrap();
        assert_relative_eq!(v, 1e6 * 100.0 + 1.0);
    }

    #[test]
    fn single_failed_rollout() {
        let v = evaluate_rollouts(&[path(&[1.0, 1.0], &[true, false])]).unwrap();
        assert_relative_eq!(v, 1.0);
    }

    #[test]
    fn negative_mean_flips_sign() {
        let v = evaluate_rollouts(&[path(&[-2.0], &[true])]).unwrap();
        assert_relative_eq!(v, -(1e6 * 100.0 + 2.0));
    }

    #[test]
    fn zero_mean_is_zero_even_on_success() {
        let v = evaluate_rollouts(&[path(&[0.0, 0.0], &[true])]).unwrap();
        assert_eq!(v, 0.0);
    }

    #[test]
    fn success_percentage_ties_round_to_even() {
        // 1 of 32 succeeds: 3.125 % rounds to 3.12, not 3.13.
        let mut paths = vec![path(&[1.0], &[true])];
        paths.extend((0..31).map(|_| path(&[1.0], &[false])));
        let v = evaluate_rollouts(&paths).unwrap();
        assert_relative_eq!(v, 3_120_001.0, max_relative = 1e-12);
    }

    #[test]
    fn round2_ties_to_even() {
        assert_eq!(round2(3.125), 3.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(100.0), 100.0);
    }

    #[test]
    fn mean_of_rollout_means() {
        // Rollout means 1.0 and 4.0 → 2.5; one of three succeeds → 33.33 %.
        let v = evaluate_rollouts(&[
            path(&[1.0], &[true]),
            path(&[2.0, 6.0], &[false]),
            path(&[2.5, 2.5, 2.5], &[false]),
        ])
        .unwrap();
        assert_relative_eq!(v, 1e6 * 33.33 + 2.5, max_relative = 1e-12);
    }

    #[test]
    fn empty_batch_is_error() {
        assert_eq!(evaluate_rollouts(&[]), Err(EvaluationError::EmptyBatch));
    }

    #[test]
    fn rollout_without_scores_is_error() {
        let paths = [path(&[1.0], &[true]), path(&[], &[true])];
        assert_eq!(
            evaluate_rollouts(&paths),
            Err(EvaluationError::EmptyRollout { index: 1 })
        );
    }

    #[test]
    fn rollout_without_bonus_is_error() {
        assert_eq!(
            evaluate_rollouts(&[path(&[1.0], &[])]),
            Err(EvaluationError::EmptyRollout { index: 0 })
        );
    }

    // ---- log format ----

    #[test]
    fn bonus_accepts_bools_and_numbers() {
        let json = r#"[{"env_infos": {"score": [1.0, 1.0], "rewards": {"bonus": [0, 1.0]}}},
                       {"env_infos": {"score": [1.0], "rewards": {"bonus": [true]}}}]"#;
        let paths: Vec<RolloutPath> = serde_json::from_str(json).unwrap();
        assert_eq!(paths[0].succeeded(), Some(true));
        assert_eq!(paths[1].succeeded(), Some(true));
        assert_relative_eq!(evaluate_rollouts(&paths).unwrap(), 1e6 * 100.0 + 1.0);
    }

    #[test]
    fn zero_bonus_is_falsy() {
        assert!(!Bonus::Value(0.0).is_truthy());
        assert!(Bonus::Value(-0.5).is_truthy());
        assert!(!Bonus::Flag(false).is_truthy());
    }
}
