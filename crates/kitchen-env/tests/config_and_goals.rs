//! Integration test: TOML configuration flowing into a running environment.
//!
//! Verifies:
//! 1. A TOML file overriding a few fields builds a working environment
//! 2. Observation width follows the configured goal width
//! 3. Uniform goal sampling stays inside the goal space and is seed-stable
//! 4. Model/config size mismatches are rejected at construction

use kitchen_core::config::KitchenConfig;
use kitchen_core::error::{KitchenError, ModelError};
use kitchen_env::prelude::*;
use kitchen_physics::kinematic::KinematicBackend;
use kitchen_physics::presets::franka_kitchen;
use kitchen_test_utils::quiet_config;

const OVERRIDES: &str = r#"
seed = 9
frame_skip = 20
settle_steps = 3

[robot]
noise_ratio = 0.0

[action]
position_gain = 0.1
resync_every_step = false
"#;

#[test]
fn toml_overrides_reach_the_environment() {
    let config = KitchenConfig::from_toml_str(OVERRIDES).unwrap();
    let mut env = KitchenEnv::builder(config, franka_kitchen())
        .scoring(RelaxScoring)
        .build()
        .unwrap();
    assert_eq!(env.backend().ticks(), 3);
    assert!(!env.config().action.resync_every_step);

    env.reset().unwrap();
    let before = env.target_pose();
    env.step(&[0.0, 1.0, 0.0, 0.0]).unwrap();
    let moved = env.target_pose().position.y - before.position.y;
    assert!((moved - 0.1).abs() < 1e-12);
}

#[test]
fn toml_from_file() {
    let path = std::env::temp_dir().join("kitchen_env_config_and_goals.toml");
    std::fs::write(&path, OVERRIDES).unwrap();
    let config = KitchenConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(config.seed, 9);
    assert_eq!(config.frame_skip, 20);
}

#[test]
fn uniform_goals_stay_in_goal_space() {
    let config = quiet_config();
    let space = kitchen_core::types::BoxSpace::symmetric(
        config.observation.goal_dim,
        config.observation.bound,
    );
    let mut env = KitchenEnv::builder(config, franka_kitchen())
        .scoring(RelaxScoring)
        .goal_sampler(UniformGoalSampler::new(space, 3))
        .build()
        .unwrap();

    let mut goals = Vec::new();
    for _ in 0..5 {
        env.reset().unwrap();
        assert!(env.goal_space().contains(env.task_goal()));
        goals.push(env.task_goal().to_vec());
    }
    assert_ne!(goals[0], goals[1]);

    env.reset_with_seed(3).unwrap();
    let first = env.task_goal().to_vec();
    env.reset_with_seed(3).unwrap();
    assert_eq!(env.task_goal(), first.as_slice());
}

#[test]
fn model_smaller_than_init_qpos_is_rejected() {
    let mut config = quiet_config();
    config.init_qpos.push(0.0);
    let err = KitchenEnv::builder(config, franka_kitchen()).build().err();
    assert!(matches!(
        err,
        Some(KitchenError::Model(ModelError::StateDimMismatch {
            field: "init_qpos",
            ..
        }))
    ));
}

#[test]
fn model_without_end_effector_site_is_rejected() {
    let mut b = KinematicBackend::builder(30);
    let hand = kitchen_physics::model::Pose::default();
    let link = b.add_body("panda0_link7", hand);
    let mocap = b.add_mocap_body("mocap", hand);
    b.add_weld(link, mocap);
    let err = KitchenEnv::builder(quiet_config(), b.build()).build().err();
    assert!(matches!(err, Some(KitchenError::Model(_))));
}
