//! Mock implementations of the environment's seams for testing.
//!
//! Provides lightweight stubs for task scoring, goal sampling and the
//! external end-effector controller that can be used in any crate's test
//! suite.

use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use kitchen_core::error::KitchenError;
use kitchen_core::types::RewardBreakdown;
use kitchen_env::controller::{ControllerFactory, EndEffectorController};
use kitchen_env::goal::GoalSampler;
use kitchen_env::observation::ObservationDict;
use kitchen_env::scoring::{ScoreCard, TaskScoring};
use kitchen_physics::backend::PhysicsBackend;
use kitchen_physics::model::Pose;

// ---------------------------------------------------------------------------
// ConstantScoring
// ---------------------------------------------------------------------------

/// Scoring that returns the same card every step.
pub struct ConstantScoring {
    card: ScoreCard,
}

impl ConstantScoring {
    /// Every step scores `score`, rewards `score`, and carries `bonus`.
    pub const fn new(score: f64, bonus: f64) -> Self {
        Self {
            card: ScoreCard {
                rewards: RewardBreakdown {
                    true_reward: score,
                    bonus,
                    total: score,
                },
                score,
            },
        }
    }
}

impl TaskScoring for ConstantScoring {
    fn evaluate(&self, _obs: &ObservationDict) -> Result<ScoreCard, KitchenError> {
        Ok(self.card)
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "ConstantScoring"
    }
}

// ---------------------------------------------------------------------------
// SuccessAfter
// ---------------------------------------------------------------------------

/// Scores 1.0 per step and raises the bonus from the `n`-th call on.
pub struct SuccessAfter {
    n: usize,
    calls: Cell<usize>,
}

impl SuccessAfter {
    pub const fn new(n: usize) -> Self {
        Self {
            n,
            calls: Cell::new(0),
        }
    }
}

impl TaskScoring for SuccessAfter {
    fn evaluate(&self, _obs: &ObservationDict) -> Result<ScoreCard, KitchenError> {
        let calls = self.calls.get() + 1;
        self.calls.set(calls);
        let bonus = if calls >= self.n { 1.0 } else { 0.0 };
        Ok(ScoreCard {
            rewards: RewardBreakdown {
                true_reward: 1.0,
                bonus,
                total: 1.0 + bonus,
            },
            score: 1.0,
        })
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "SuccessAfter"
    }
}

// ---------------------------------------------------------------------------
// GoalDistance
// ---------------------------------------------------------------------------

/// Scores the negative L1 distance between object positions and the tail of
/// the goal vector.
pub struct GoalDistance;

impl TaskScoring for GoalDistance {
    fn evaluate(&self, obs: &ObservationDict) -> Result<ScoreCard, KitchenError> {
        let offset = obs.goal.len().saturating_sub(obs.object_pos.len());
        let distance: f64 = obs
            .object_pos
            .iter()
            .zip(&obs.goal[offset..])
            .map(|(p, g)| (p - g).abs())
            .sum();
        Ok(ScoreCard {
            rewards: RewardBreakdown {
                true_reward: -distance,
                bonus: 0.0,
                total: -distance,
            },
            score: -distance,
        })
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "GoalDistance"
    }
}

// ---------------------------------------------------------------------------
// CyclingGoals
// ---------------------------------------------------------------------------

/// Goal sampler replaying a fixed list of goals, cycling when exhausted.
pub struct CyclingGoals {
    goals: Vec<Vec<f64>>,
    index: usize,
}

impl CyclingGoals {
    /// # Panics
    ///
    /// Panics if `goals` is empty.
    pub fn new(goals: Vec<Vec<f64>>) -> Self {
        assert!(!goals.is_empty(), "CyclingGoals requires at least one goal");
        Self { goals, index: 0 }
    }
}

impl GoalSampler for CyclingGoals {
    fn sample(&mut self, _current: &[f64]) -> Vec<f64> {
        let goal = self.goals[self.index].clone();
        self.index = (self.index + 1) % self.goals.len();
        goal
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "CyclingGoals"
    }

    fn reseed(&mut self, _seed: u64) {
        self.index = 0;
    }
}

// ---------------------------------------------------------------------------
// RecordingController / RecordingFactory
// ---------------------------------------------------------------------------

/// What a [`RecordingFactory`] and its controllers have seen.
#[derive(Debug, Default)]
pub struct ControllerLog {
    pub builds: AtomicUsize,
    pub commands: AtomicUsize,
    pub goals: Mutex<Vec<Pose>>,
    pub links: Mutex<Vec<String>>,
}

impl ControllerLog {
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn commands(&self) -> usize {
        self.commands.load(Ordering::SeqCst)
    }

    pub fn goals(&self) -> Vec<Pose> {
        self.goals.lock().map(|g| g.clone()).unwrap_or_default()
    }

    pub fn links(&self) -> Vec<String> {
        self.links.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

/// Controller that outputs a fixed command and logs every call.
pub struct RecordingController {
    command: Vec<f64>,
    log: Arc<ControllerLog>,
}

impl EndEffectorController for RecordingController {
    fn set_goal(&mut self, goal: &Pose) {
        if let Ok(mut goals) = self.log.goals.lock() {
            goals.push(*goal);
        }
    }

    fn command(&mut self, _backend: &dyn PhysicsBackend) -> Vec<f64> {
        self.log.commands.fetch_add(1, Ordering::SeqCst);
        self.command.clone()
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "RecordingController"
    }
}

/// Factory producing [`RecordingController`]s that share one log.
pub struct RecordingFactory {
    command: Vec<f64>,
    log: Arc<ControllerLog>,
}

impl RecordingFactory {
    /// Controllers built by this factory always output `command`.
    pub fn new(command: Vec<f64>) -> Self {
        Self {
            command,
            log: Arc::new(ControllerLog::default()),
        }
    }

    /// Shared handle to the call log.
    pub fn log(&self) -> Arc<ControllerLog> {
        Arc::clone(&self.log)
    }
}

impl ControllerFactory for RecordingFactory {
    fn build(
        &self,
        _backend: &dyn PhysicsBackend,
        controlled_link: &str,
    ) -> Box<dyn EndEffectorController> {
        self.log.builds.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut links) = self.log.links.lock() {
            links.push(controlled_link.to_owned());
        }
        Box::new(RecordingController {
            command: self.command.clone(),
            log: Arc::clone(&self.log),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
