//! Baseline policies.
//!
//! All policies implement [`Policy`] from `kitchen-core` and emit 4-d
//! `[dx, dy, dz, grip]` actions.

use kitchen_core::traits::Policy;
use kitchen_core::types::{BoxSpace, Observation};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ---------------------------------------------------------------------------
// ZeroPolicy
// ---------------------------------------------------------------------------

/// Policy that always returns a zero action.
pub struct ZeroPolicy {
    dim: usize,
}

impl ZeroPolicy {
    pub const fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Policy for ZeroPolicy {
    fn get_action(&mut self, _obs: &Observation) -> Vec<f64> {
        vec![0.0; self.dim]
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "ZeroPolicy"
    }
}

// ---------------------------------------------------------------------------
// ConstantPolicy
// ---------------------------------------------------------------------------

/// Policy that always returns the same fixed action.
pub struct ConstantPolicy {
    action: Vec<f64>,
}

impl ConstantPolicy {
    pub const fn new(action: Vec<f64>) -> Self {
        Self { action }
    }
}

impl Policy for ConstantPolicy {
    fn get_action(&mut self, _obs: &Observation) -> Vec<f64> {
        self.action.clone()
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "ConstantPolicy"
    }
}

// ---------------------------------------------------------------------------
// RandomPolicy
// ---------------------------------------------------------------------------

/// Policy that samples uniformly from an action box.
///
/// Uses a seeded RNG for determinism.
pub struct RandomPolicy {
    space: BoxSpace,
    rng: ChaCha8Rng,
}

impl RandomPolicy {
    pub fn new(space: BoxSpace, seed: u64) -> Self {
        Self {
            space,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn get_action(&mut self, _obs: &Observation) -> Vec<f64> {
        self.space.sample(&mut self.rng)
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "RandomPolicy"
    }

    fn is_deterministic(&self) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// ScriptedPolicy
// ---------------------------------------------------------------------------

/// Policy that replays a fixed sequence of actions, cycling when exhausted.
pub struct ScriptedPolicy {
    actions: Vec<Vec<f64>>,
    index: usize,
}

impl ScriptedPolicy {
    /// # Panics
    ///
    /// Panics if `actions` is empty.
    pub fn new(actions: Vec<Vec<f64>>) -> Self {
        assert!(
            !actions.is_empty(),
            "ScriptedPolicy requires at least one action"
        );
        Self { actions, index: 0 }
    }

    /// Restart the script from its first action.
    pub const fn rewind(&mut self) {
        self.index = 0;
    }
}

impl Policy for ScriptedPolicy {
    fn get_action(&mut self, _obs: &Observation) -> Vec<f64> {
        let action = self.actions[self.index].clone();
        self.index = (self.index + 1) % self.actions.len();
        action
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "ScriptedPolicy"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
