//! Baseline policies and the rollout runner for the kitchen environment.
//!
//! Provides simple policies (zero, constant, random, scripted) and a
//! [`PolicyRunner`](runner::PolicyRunner) that drives the observe / decide /
//! act loop and records episodes for offline evaluation.
//!
//! # Example
//!
//! ```
//! use kitchen_core::config::KitchenConfig;
//! use kitchen_env::prelude::*;
//! use kitchen_physics::presets::franka_kitchen;
//! use kitchen_policy::prelude::*;
//!
//! let mut env = KitchenEnv::builder(KitchenConfig::default(), franka_kitchen())
//!     .scoring(RelaxScoring)
//!     .build()
//!     .unwrap();
//! let mut runner = PolicyRunner::new(Box::new(ZeroPolicy::new(4)), 4);
//! let path = runner.run_episode(&mut env, 5, Some(0)).unwrap();
//! assert_eq!(path.env_infos.score.len(), 5);
//! ```

pub mod policies;
pub mod runner;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        policies::{ConstantPolicy, RandomPolicy, ScriptedPolicy, ZeroPolicy},
        runner::PolicyRunner,
    };
}
