//! Goal-conditioned kitchen manipulation environment.
//!
//! [`KitchenEnv`](env::KitchenEnv) drives a robot arm in a kitchen scene
//! through any [`PhysicsBackend`](kitchen_physics::backend::PhysicsBackend):
//!
//! - [`sensors`] — joint state readout with proportional noise
//! - [`observation`] — observation dict and flat goal-conditioned vector
//! - [`goal`] — goal ownership and pluggable resampling
//! - [`scoring`] — the per-task scoring hook
//! - [`evaluate`] — offline success metric over recorded rollouts
//! - [`recorder`] — rollout capture in the evaluation log format
//! - [`controller`] — seam for an external end-effector controller
//!
//! # Example
//!
//! ```
//! use kitchen_core::config::KitchenConfig;
//! use kitchen_env::prelude::*;
//! use kitchen_physics::presets::franka_kitchen;
//!
//! let mut env = KitchenEnv::builder(KitchenConfig::default(), franka_kitchen())
//!     .scoring(RelaxScoring)
//!     .build()
//!     .unwrap();
//! let obs = env.reset().unwrap();
//! assert_eq!(obs.len(), 60);
//! let step = env.step(&[0.0, 0.0, 1.0, 0.0]).unwrap();
//! assert!(!step.done);
//! ```

pub mod controller;
pub mod env;
pub mod episode;
pub mod evaluate;
pub mod goal;
pub mod observation;
pub mod recorder;
pub mod scoring;
pub mod sensors;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::controller::{ControllerFactory, EndEffectorController};
    pub use crate::env::{KitchenEnv, KitchenEnvBuilder};
    pub use crate::episode::Episode;
    pub use crate::evaluate::{Bonus, RolloutPath, evaluate_rollouts};
    pub use crate::goal::{GoalManager, GoalSampler, KeepCurrentGoal, UniformGoalSampler};
    pub use crate::observation::{ObservationAssembler, ObservationDict};
    pub use crate::recorder::RolloutRecorder;
    pub use crate::scoring::{RelaxScoring, ScoreCard, TaskScoring, UnimplementedScoring};
    pub use crate::sensors::{RobotState, RobotStateReader};
}
