//! Shared types, error taxonomy, and configuration for the kitchen
//! manipulation environment.
//!
//! Every other crate in the workspace builds on these definitions:
//!
//! - [`config`] — [`KitchenConfig`](config::KitchenConfig) and its sections,
//!   loadable from TOML
//! - [`error`] — [`KitchenError`](error::KitchenError) and the per-concern
//!   error enums
//! - [`types`] — [`Observation`](types::Observation),
//!   [`BoxSpace`](types::BoxSpace), [`StepResult`](types::StepResult)
//! - [`traits`] — the [`Policy`](traits::Policy) seam used by rollout drivers

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::config::{
        ActionConfig, EndEffectorConfig, KitchenConfig, ObservationConfig, RobotConfig,
    };
    pub use crate::error::{
        ConfigError, ContractError, EvaluationError, KitchenError, ModelError,
    };
    pub use crate::traits::Policy;
    pub use crate::types::{BoxSpace, Observation, RewardBreakdown, StepInfo, StepResult};
}
