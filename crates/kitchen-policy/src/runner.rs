//! Policy runner driving the observe / decide / act loop.
//!
//! [`PolicyRunner`] holds a boxed [`Policy`] and the current action.
//! [`run_episode`](PolicyRunner::run_episode) resets an environment, steps it
//! with the policy, and records the episode in the offline evaluation format.

use kitchen_core::error::KitchenError;
use kitchen_core::traits::Policy;
use kitchen_core::types::Observation;
use kitchen_env::env::KitchenEnv;
use kitchen_env::evaluate::RolloutPath;
use kitchen_env::recorder::RolloutRecorder;
use kitchen_physics::backend::PhysicsBackend;
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// PolicyRunner
// ---------------------------------------------------------------------------

/// Drives policy inference each step.
pub struct PolicyRunner {
    policy: Box<dyn Policy>,
    current_action: Vec<f64>,
    action_dim: usize,
    recorder: RolloutRecorder,
}

impl PolicyRunner {
    pub fn new(policy: Box<dyn Policy>, action_dim: usize) -> Self {
        Self {
            policy,
            current_action: vec![0.0; action_dim],
            action_dim,
            recorder: RolloutRecorder::new(),
        }
    }

    /// Result of the last [`decide`](Self::decide).
    pub fn action(&self) -> &[f64] {
        &self.current_action
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    /// Run the policy on `obs` and store the resulting action.
    pub fn decide(&mut self, obs: &Observation) {
        self.current_action = self.policy.get_action(obs);
    }

    /// Reset the current action to zeros.
    pub fn reset(&mut self) {
        self.current_action = vec![0.0; self.action_dim];
    }

    /// Reset `env` (reseeded when `seed` is given), then step it `steps`
    /// times with the policy.
    pub fn run_episode<B: PhysicsBackend>(
        &mut self,
        env: &mut KitchenEnv<B>,
        steps: u32,
        seed: Option<u64>,
    ) -> Result<RolloutPath, KitchenError> {
        self.reset();
        self.recorder.clear();
        let mut obs = match seed {
            Some(seed) => env.reset_with_seed(seed)?,
            None => env.reset()?,
        };
        for _ in 0..steps {
            self.decide(&obs);
            let result = env.step(&self.current_action)?;
            self.recorder.record(&result);
            debug!(
                step = env.episode().step_count,
                reward = result.reward,
                score = result.info.score,
                "step"
            );
            obs = result.observation;
        }

        let episode = env.episode();
        info!(
            episode = episode.episode_number,
            policy = self.policy.name(),
            steps = episode.step_count,
            total_reward = episode.total_reward,
            mean_score = episode.mean_score().unwrap_or(0.0),
            "episode finished"
        );
        Ok(self.recorder.finish())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
