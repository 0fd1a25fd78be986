//! Ready-to-step environments over the kinematic Franka kitchen.

use kitchen_core::config::KitchenConfig;
use kitchen_env::env::KitchenEnv;
use kitchen_env::scoring::{RelaxScoring, TaskScoring};
use kitchen_physics::kinematic::KinematicBackend;
use kitchen_physics::presets::franka_kitchen;

/// Default config with observation noise switched off.
pub fn quiet_config() -> KitchenConfig {
    let mut config = KitchenConfig::default();
    config.robot.noise_ratio = 0.0;
    config
}

/// Kitchen environment scored by `scoring`, built from `config`.
///
/// # Panics
///
/// Panics if the environment cannot be built.
pub fn kitchen_env_with(
    config: KitchenConfig,
    scoring: impl TaskScoring + 'static,
) -> KitchenEnv<KinematicBackend> {
    KitchenEnv::builder(config, franka_kitchen())
        .scoring(scoring)
        .build()
        .unwrap_or_else(|e| panic!("test environment failed to build: {e}"))
}

/// Relax-task environment with default config.
pub fn relax_env() -> KitchenEnv<KinematicBackend> {
    kitchen_env_with(KitchenConfig::default(), RelaxScoring)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relax_env_builds_and_steps() {
        let mut env = relax_env();
        env.reset().unwrap();
        assert!(env.step(&[0.0; 4]).is_ok());
    }

    #[test]
    fn quiet_config_disables_noise() {
        assert!(quiet_config().robot.noise_ratio.abs() < f64::EPSILON);
    }
}
