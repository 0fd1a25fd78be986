//! [`KitchenEnv`] — the step/reset lifecycle over a physics backend.
//!
//! # Construction
//!
//! 1. validate the config and the backend's size
//! 2. build the weld table, neutralise every weld, `forward`
//! 3. place the end-effector mocap at `site + target_offset` with the fixed
//!    orientation
//! 4. run `settle_steps` engine ticks
//!
//! # Step
//!
//! ```text
//! action → clip → encode → dispatch actuators
//!                        → resync targets (first step, or every step) → apply delta
//!        → engine tick → read state (+ noise) → assemble → score
//! ```

use kitchen_actuator::compliance::ComplianceTargetTracker;
use kitchen_actuator::dispatch::ActuatorDispatcher;
use kitchen_actuator::encoder::ActionEncoder;
use kitchen_core::config::KitchenConfig;
use kitchen_core::error::{ContractError, EvaluationError, KitchenError, ModelError};
use kitchen_core::types::{BoxSpace, Observation, StepInfo, StepResult, validate_action};
use kitchen_physics::backend::PhysicsBackend;
use kitchen_physics::model::{MocapId, Pose};
use nalgebra::{Quaternion, Vector3};
use tracing::{debug, info};

use crate::controller::{ControllerFactory, EndEffectorController};
use crate::episode::Episode;
use crate::evaluate::{RolloutPath, evaluate_rollouts};
use crate::goal::{GoalManager, GoalSampler, KeepCurrentGoal};
use crate::observation::{ObservationAssembler, ObservationDict};
use crate::scoring::{TaskScoring, UnimplementedScoring};
use crate::sensors::RobotStateReader;

/// Per-tick finger closing applied by [`KitchenEnv::grasp`].
pub const GRASP_INCREMENT: f64 = 0.0003;

/// Per-tick wrist rotation applied by [`KitchenEnv::rotate_ee`], in radians.
pub const ROTATE_INCREMENT: f64 = 0.01;

// ---------------------------------------------------------------------------
// KitchenEnvBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`KitchenEnv`].
///
/// Scoring defaults to [`UnimplementedScoring`], so a task must be supplied
/// before `step` can succeed. Goals default to [`KeepCurrentGoal`].
pub struct KitchenEnvBuilder<B: PhysicsBackend> {
    config: KitchenConfig,
    backend: B,
    scoring: Box<dyn TaskScoring>,
    goal_sampler: Box<dyn GoalSampler>,
    controller_factory: Option<Box<dyn ControllerFactory>>,
}

impl<B: PhysicsBackend> KitchenEnvBuilder<B> {
    pub fn new(config: KitchenConfig, backend: B) -> Self {
        Self {
            config,
            backend,
            scoring: Box::new(UnimplementedScoring),
            goal_sampler: Box::new(KeepCurrentGoal),
            controller_factory: None,
        }
    }

    /// Set the task scoring hook.
    #[must_use]
    pub fn scoring(mut self, scoring: impl TaskScoring + 'static) -> Self {
        self.scoring = Box::new(scoring);
        self
    }

    /// Set how goals are chosen on reset.
    #[must_use]
    pub fn goal_sampler(mut self, sampler: impl GoalSampler + 'static) -> Self {
        self.goal_sampler = Box::new(sampler);
        self
    }

    /// Set the factory for the external end-effector controller.
    #[must_use]
    pub fn controller_factory(mut self, factory: impl ControllerFactory + 'static) -> Self {
        self.controller_factory = Some(Box::new(factory));
        self
    }

    /// Construct the environment and settle the scene.
    pub fn build(self) -> Result<KitchenEnv<B>, KitchenError> {
        let Self {
            config,
            mut backend,
            scoring,
            goal_sampler,
            controller_factory,
        } = self;
        config.validate()?;

        let nq = backend.qpos().len();
        let required = config.robot.n_dofs();
        if nq < required {
            return Err(ModelError::InsufficientDofs {
                required,
                available: nq,
            }
            .into());
        }
        if config.init_qpos.len() != nq {
            return Err(ModelError::StateDimMismatch {
                field: "init_qpos",
                expected: nq,
                got: config.init_qpos.len(),
            }
            .into());
        }
        let nv = backend.qvel().len();
        let init_qvel = config.init_qvel.clone().unwrap_or_else(|| vec![0.0; nv]);
        if init_qvel.len() != nv {
            return Err(ModelError::StateDimMismatch {
                field: "init_qvel",
                expected: nv,
                got: init_qvel.len(),
            }
            .into());
        }

        let tracker = ComplianceTargetTracker::new(&backend)?;
        tracker.reset_welds(&mut backend);

        let ee = &config.end_effector;
        let mocap = backend
            .mocap_by_name(&ee.mocap)
            .ok_or_else(|| ModelError::UnknownMocap(ee.mocap.clone()))?;
        let site = backend.site_position(&ee.site)?;
        let [w, x, y, z] = config.action.orientation;
        let target = Pose::new(
            site + Vector3::from(ee.target_offset),
            Quaternion::new(w, x, y, z),
        );
        backend.set_mocap_pose(mocap, target);
        for _ in 0..config.settle_steps {
            backend.step();
        }
        debug!(
            settle_steps = config.settle_steps,
            x = target.position.x,
            y = target.position.y,
            z = target.position.z,
            "end-effector target placed"
        );

        let observation_dim = config.observation_dim();
        let observation_space = BoxSpace::symmetric(observation_dim, config.observation.bound);
        let env_lim = observation_space.low[0].abs();
        let goal_space = BoxSpace::symmetric(observation_dim / 2, env_lim);
        let action_space = BoxSpace::symmetric(ActionEncoder::ACTION_DIM, config.action.bound);

        info!(
            backend = backend.name(),
            task = scoring.name(),
            goals = goal_sampler.name(),
            observation_dim,
            welds = tracker.table().len(),
            "kitchen environment ready"
        );

        Ok(KitchenEnv {
            encoder: ActionEncoder::from_config(&config.action),
            reader: RobotStateReader::new(&config.robot, config.seed),
            assembler: ObservationAssembler::new(observation_dim),
            goals: GoalManager::new(config.observation.goal_dim, goal_sampler),
            tracker,
            scoring,
            controller_factory,
            controller: None,
            mocap,
            action_space,
            observation_space,
            goal_space,
            obs_dict: ObservationDict::default(),
            episode: Episode::default(),
            init_qvel,
            targets_synced: false,
            initializing: true,
            backend,
            config,
        })
    }
}

// ---------------------------------------------------------------------------
// KitchenEnv
// ---------------------------------------------------------------------------

/// Goal-conditioned kitchen manipulation environment.
///
/// Owns its backend exclusively; `step` and `reset` take `&mut self`.
pub struct KitchenEnv<B: PhysicsBackend> {
    config: KitchenConfig,
    backend: B,
    encoder: ActionEncoder,
    tracker: ComplianceTargetTracker,
    reader: RobotStateReader,
    assembler: ObservationAssembler,
    goals: GoalManager,
    scoring: Box<dyn TaskScoring>,
    controller_factory: Option<Box<dyn ControllerFactory>>,
    controller: Option<Box<dyn EndEffectorController>>,
    mocap: MocapId,
    action_space: BoxSpace,
    observation_space: BoxSpace,
    goal_space: BoxSpace,
    obs_dict: ObservationDict,
    episode: Episode,
    init_qvel: Vec<f64>,
    /// Mocap targets have been snapped to their bodies since the last reset.
    targets_synced: bool,
    /// Next step is the first since construction or reset.
    initializing: bool,
}

impl<B: PhysicsBackend> KitchenEnv<B> {
    pub fn builder(config: KitchenConfig, backend: B) -> KitchenEnvBuilder<B> {
        KitchenEnvBuilder::new(config, backend)
    }

    // -- lifecycle --

    /// Restore the initial joint state and resample the goal.
    pub fn reset(&mut self) -> Result<Observation, KitchenError> {
        self.reset_inner(None)
    }

    /// Like [`reset`](Self::reset), but first reseeds observation noise and
    /// the goal sampler.
    pub fn reset_with_seed(&mut self, seed: u64) -> Result<Observation, KitchenError> {
        self.reader.reseed(seed);
        self.goals.reseed(seed);
        self.reset_inner(Some(seed))
    }

    fn reset_inner(&mut self, seed: Option<u64>) -> Result<Observation, KitchenError> {
        self.backend
            .set_state(&self.config.init_qpos, &self.init_qvel)?;
        self.backend.forward();
        self.goals.resample()?;
        self.targets_synced = false;
        self.initializing = true;
        self.controller = None;
        self.episode.reset(seed);
        debug!(episode = self.episode.episode_number, ?seed, "reset");
        self.observe()
    }

    /// Apply a 4-d action `[dx, dy, dz, grip]` and advance one engine tick.
    ///
    /// The action is clipped to the action space. `done` is always `false`.
    /// The first step after construction or reset refreshes the goal from
    /// the sampler and builds the end-effector controller.
    pub fn step(&mut self, action: &[f64]) -> Result<StepResult, KitchenError> {
        validate_action(action, ActionEncoder::ACTION_DIM)?;
        let action = self.action_space.clip(action);

        if self.initializing {
            self.initializing = false;
            self.goals.resample()?;
            if let Some(factory) = &self.controller_factory {
                let controller =
                    factory.build(&self.backend, &self.config.end_effector.controlled_link);
                debug!(controller = controller.name(), "end-effector controller built");
                self.controller = Some(controller);
            }
        }

        let command = self.encoder.encode(&action)?;
        ActuatorDispatcher::check_len(&self.backend, command.as_slice())?;
        ActuatorDispatcher::apply(&mut self.backend, command.as_slice())?;
        if !self.targets_synced || self.config.action.resync_every_step {
            self.tracker.resync_to_body(&mut self.backend);
            self.targets_synced = true;
        }
        self.tracker
            .apply_delta(&mut self.backend, command.as_slice())?;
        self.backend.step();

        let observation = self.observe()?;
        let card = self.scoring.evaluate(&self.obs_dict)?;
        self.episode.advance(card.rewards.total, card.score);

        Ok(StepResult {
            observation,
            reward: card.rewards.total,
            done: false,
            info: StepInfo {
                time: self.obs_dict.time,
                score: card.score,
                rewards: card.rewards,
            },
        })
    }

    /// Release the backend's resources and hand it back.
    pub fn close(self) -> B {
        let mut backend = self.backend;
        backend.close();
        info!(episodes = self.episode.episode_number, "kitchen environment closed");
        backend
    }

    fn observe(&mut self) -> Result<Observation, KitchenError> {
        let state = self
            .reader
            .read(&self.backend, self.config.robot.noise_ratio)?;
        let (dict, flat) = self.assembler.assemble(state, self.goals.get())?;
        self.obs_dict = dict;
        Ok(flat)
    }

    // -- goals --

    /// Override the goal until the next reset resamples it.
    pub fn set_goal(&mut self, goal: &[f64]) -> Result<(), ContractError> {
        self.goals.set(goal)
    }

    pub fn task_goal(&self) -> &[f64] {
        self.goals.get()
    }

    /// Score a batch of recorded rollouts.
    pub fn evaluate_success(&self, paths: &[RolloutPath]) -> Result<f64, EvaluationError> {
        evaluate_rollouts(paths)
    }

    // -- scripted primitives --

    /// Close both fingers by [`GRASP_INCREMENT`] per tick for `frame_skip`
    /// ticks.
    pub fn grasp(&mut self) {
        let (left, right) = self.finger_joints();
        for _ in 0..self.config.frame_skip {
            let qpos = self.backend.qpos_mut();
            qpos[left] -= GRASP_INCREMENT;
            qpos[right] -= GRASP_INCREMENT;
            self.backend.step();
        }
    }

    /// Turn the wrist by [`ROTATE_INCREMENT`] per tick for `frame_skip`
    /// ticks.
    pub fn rotate_ee(&mut self) {
        let wrist = self.config.robot.n_dof_robot - 3;
        for _ in 0..self.config.frame_skip {
            self.backend.qpos_mut()[wrist] -= ROTATE_INCREMENT;
            self.backend.step();
        }
    }

    /// Drive the end effector toward `pose` with the external controller for
    /// `frame_skip` ticks.
    ///
    /// Builds the controller if the first step has not run yet. Fails with
    /// [`KitchenError::NotImplemented`] when no controller factory was
    /// configured.
    pub fn goto_pose(&mut self, pose: &Pose) -> Result<(), KitchenError> {
        if self.controller.is_none() {
            let factory = self.controller_factory.as_ref().ok_or_else(|| {
                KitchenError::NotImplemented(
                    "goto_pose: no end-effector controller factory configured".into(),
                )
            })?;
            self.controller =
                Some(factory.build(&self.backend, &self.config.end_effector.controlled_link));
        }
        let Some(controller) = self.controller.as_mut() else {
            return Ok(());
        };
        controller.set_goal(pose);
        for _ in 0..self.config.frame_skip {
            let command = controller.command(&self.backend);
            let nu = self.backend.nu();
            if command.len() != nu {
                return Err(ContractError::ActuatorCountMismatch {
                    expected: nu,
                    got: command.len(),
                }
                .into());
            }
            self.backend.ctrl_mut().copy_from_slice(&command);
            self.backend.step();
        }
        Ok(())
    }

    const fn finger_joints(&self) -> (usize, usize) {
        let n = self.config.robot.n_dof_robot;
        (n - 2, n - 1)
    }

    // -- accessors --

    pub const fn config(&self) -> &KitchenConfig {
        &self.config
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }

    pub const fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Named view of the last observation.
    pub const fn obs_dict(&self) -> &ObservationDict {
        &self.obs_dict
    }

    pub const fn episode(&self) -> &Episode {
        &self.episode
    }

    /// Current end-effector mocap target.
    pub fn target_pose(&self) -> Pose {
        self.backend.mocap_pose(self.mocap)
    }

    pub const fn action_space(&self) -> &BoxSpace {
        &self.action_space
    }

    pub const fn observation_space(&self) -> &BoxSpace {
        &self.observation_space
    }

    /// Goal box: half the observation width, bounded by `|obs.low[0]|`.
    pub const fn goal_space(&self) -> &BoxSpace {
        &self.goal_space
    }

    pub fn task_name(&self) -> &str {
        self.scoring.name()
    }

    /// Whether a controller has been built for this episode.
    pub const fn has_controller(&self) -> bool {
        self.controller.is_some()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::RelaxScoring;
    use approx::assert_relative_eq;
    use kitchen_physics::kinematic::KinematicBackend;
    use kitchen_physics::model::NEUTRAL_WELD_DATA;
    use kitchen_physics::presets::franka_kitchen;

    fn relax_env() -> KitchenEnv<KinematicBackend> {
        KitchenEnv::builder(KitchenConfig::default(), franka_kitchen())
            .scoring(RelaxScoring)
            .build()
            .unwrap()
    }

    fn quiet_config() -> KitchenConfig {
        let mut config = KitchenConfig::default();
        config.robot.noise_ratio = 0.0;
        config
    }

    // ---- construction ----

    #[test]
    fn construction_places_target_and_settles() {
        let env = relax_env();
        let backend = env.backend();
        assert_eq!(backend.ticks(), 10);
        assert_eq!(backend.equality_data(0), NEUTRAL_WELD_DATA);
        assert_eq!(env.target_pose().wxyz(), [1.0, 0.0, 1.0, 0.0]);
        // Target sits at end_effector site + gripper offset.
        let pose = env.target_pose();
        assert_relative_eq!(pose.position.x, -0.269 - 0.498, epsilon = 1e-12);
        assert_relative_eq!(pose.position.z, 2.2 - 0.1 - 0.421, epsilon = 1e-12);
    }

    #[test]
    fn spaces() {
        let env = relax_env();
        assert_eq!(env.action_space().dim(), 4);
        assert_eq!(env.action_space().high, vec![1.0; 4]);
        assert_eq!(env.observation_space().dim(), 60);
        assert_eq!(env.observation_space().low[0], -8.0);
        assert_eq!(env.goal_space().dim(), 30);
        assert_eq!(env.goal_space().high[0], 8.0);
    }

    #[test]
    fn build_rejects_short_model() {
        let backend = KinematicBackend::builder(12).build();
        let err = KitchenEnv::builder(KitchenConfig::default(), backend)
            .build()
            .err()
            .unwrap();
        assert!(matches!(
            err,
            KitchenError::Model(ModelError::InsufficientDofs {
                required: 30,
                available: 12
            })
        ));
    }

    #[test]
    fn build_rejects_unknown_mocap() {
        let mut config = KitchenConfig::default();
        config.end_effector.mocap = "nope".into();
        let err = KitchenEnv::builder(config, franka_kitchen())
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, KitchenError::Model(ModelError::UnknownMocap(_))));
    }

    #[test]
    fn build_rejects_invalid_config() {
        let config = KitchenConfig {
            frame_skip: 0,
            ..KitchenConfig::default()
        };
        assert!(matches!(
            KitchenEnv::builder(config, franka_kitchen()).build(),
            Err(KitchenError::Config(_))
        ));
    }

    // ---- reset ----

    #[test]
    fn reset_restores_init_qpos() {
        let mut env = KitchenEnv::builder(quiet_config(), franka_kitchen())
            .scoring(RelaxScoring)
            .build()
            .unwrap();
        let obs = env.reset().unwrap();
        assert_eq!(obs.len(), 60);
        assert_eq!(env.backend().qpos(), env.config().init_qpos.as_slice());
        assert_eq!(&obs.as_slice()[..30], env.config().init_qpos.as_slice());
        assert_eq!(env.episode().episode_number, 1);
    }

    #[test]
    fn reset_with_seed_is_reproducible() {
        let mut env = relax_env();
        let a = env.reset_with_seed(5).unwrap();
        let b = env.reset_with_seed(5).unwrap();
        assert_eq!(a, b);
        assert_eq!(env.episode().seed, Some(5));
    }

    // ---- step ----

    #[test]
    fn step_reports_relax_scores() {
        let mut env = relax_env();
        env.reset().unwrap();
        let result = env.step(&[0.0, 0.0, 0.0, 0.0]).unwrap();
        assert!(!result.done);
        assert_eq!(result.reward, 0.0);
        assert_eq!(result.info.score, 0.0);
        assert_eq!(result.observation.len(), 60);
        assert_relative_eq!(result.info.time, env.backend().time());
        assert_eq!(env.episode().step_count, 1);
    }

    #[test]
    fn step_without_task_is_not_implemented() {
        let mut env = KitchenEnv::builder(KitchenConfig::default(), franka_kitchen())
            .build()
            .unwrap();
        env.reset().unwrap();
        assert!(matches!(
            env.step(&[0.0; 4]),
            Err(KitchenError::NotImplemented(_))
        ));
    }

    #[test]
    fn step_rejects_wrong_width() {
        let mut env = relax_env();
        assert!(matches!(
            env.step(&[0.0; 3]),
            Err(KitchenError::Contract(ContractError::ActionDimMismatch {
                expected: 4,
                got: 3
            }))
        ));
    }

    #[test]
    fn step_moves_target_by_gain_times_clipped_action() {
        let mut env = relax_env();
        env.reset().unwrap();
        let before = env.target_pose();
        env.step(&[5.0, 0.0, -1.0, 0.0]).unwrap();
        let after = env.target_pose();
        assert_relative_eq!(after.position.x - before.position.x, 0.05, epsilon = 1e-12);
        assert_relative_eq!(after.position.z - before.position.z, -0.05, epsilon = 1e-12);
        assert_eq!(after.orientation, before.orientation);
    }

    #[test]
    fn gripper_command_is_a_delta_on_both_fingers() {
        let mut env = relax_env();
        env.reset().unwrap();
        let q7 = env.backend().qpos()[7];
        let q8 = env.backend().qpos()[8];
        env.step(&[0.0, 0.0, 0.0, 0.5]).unwrap();
        assert_relative_eq!(env.backend().qpos()[7], q7 + 0.5);
        assert_relative_eq!(env.backend().qpos()[8], q8 + 0.5);
    }

    // ---- goals ----

    #[test]
    fn goal_round_trip_and_observation() {
        let mut env = KitchenEnv::builder(quiet_config(), franka_kitchen())
            .scoring(RelaxScoring)
            .build()
            .unwrap();
        env.reset().unwrap();
        let goal: Vec<f64> = (0..30).map(f64::from).collect();
        env.set_goal(&goal).unwrap();
        assert_eq!(env.task_goal(), goal.as_slice());
        let result = env.step(&[0.0; 4]).unwrap();
        assert_eq!(&result.observation.as_slice()[30..], goal.as_slice());
        assert_eq!(env.obs_dict().goal, goal);
    }

    /// Counts samples and returns the count as a constant goal.
    struct CountingGoals(f64);

    impl GoalSampler for CountingGoals {
        fn sample(&mut self, current: &[f64]) -> Vec<f64> {
            self.0 += 1.0;
            vec![self.0; current.len()]
        }

        #[allow(clippy::unnecessary_literal_bound)]
        fn name(&self) -> &str {
            "CountingGoals"
        }
    }

    #[test]
    fn first_step_refreshes_goal() {
        let mut env = KitchenEnv::builder(quiet_config(), franka_kitchen())
            .scoring(RelaxScoring)
            .goal_sampler(CountingGoals(0.0))
            .build()
            .unwrap();
        env.reset().unwrap();
        assert_eq!(env.task_goal(), vec![1.0; 30].as_slice());

        let result = env.step(&[0.0; 4]).unwrap();
        assert_eq!(&result.observation.as_slice()[30..], vec![2.0; 30].as_slice());

        // Later steps keep the goal.
        env.step(&[0.0; 4]).unwrap();
        assert_eq!(env.task_goal(), vec![2.0; 30].as_slice());
    }

    #[test]
    fn set_goal_rejects_wrong_width() {
        let mut env = relax_env();
        assert_eq!(
            env.set_goal(&[0.0; 29]),
            Err(ContractError::GoalDimMismatch {
                expected: 30,
                got: 29
            })
        );
    }

    // ---- primitives ----

    /// Kitchen layout without finger servos, so primitive edits to qpos
    /// are not overwritten by tracking actuators.
    fn unactuated_kitchen() -> KinematicBackend {
        let hand = Pose::from_arrays([0.0, 0.5, 2.0], [1.0, 0.0, 1.0, 0.0]);
        let mut b = KinematicBackend::builder(30);
        let link7 = b.add_body("panda0_link7", hand);
        let mocap = b.add_mocap_body("mocap", hand);
        b.add_weld(mocap, link7);
        b.add_site("end_effector", link7, Vector3::zeros());
        b.build()
    }

    #[test]
    fn grasp_closes_fingers() {
        let mut env = KitchenEnv::builder(quiet_config(), unactuated_kitchen())
            .scoring(RelaxScoring)
            .build()
            .unwrap();
        env.reset().unwrap();
        let q7 = env.backend().qpos()[7];
        let q8 = env.backend().qpos()[8];
        let ticks = env.backend().ticks();
        env.grasp();
        assert_eq!(env.backend().ticks(), ticks + 40);
        assert_relative_eq!(env.backend().qpos()[7], q7 - 40.0 * GRASP_INCREMENT, epsilon = 1e-12);
        assert_relative_eq!(env.backend().qpos()[8], q8 - 40.0 * GRASP_INCREMENT, epsilon = 1e-12);
    }

    #[test]
    fn rotate_ee_turns_wrist() {
        let mut env = relax_env();
        env.reset().unwrap();
        let q6 = env.backend().qpos()[6];
        env.rotate_ee();
        assert_relative_eq!(env.backend().qpos()[6], q6 - 40.0 * ROTATE_INCREMENT, epsilon = 1e-9);
    }

    #[test]
    fn goto_pose_without_factory_fails() {
        let mut env = relax_env();
        assert!(matches!(
            env.goto_pose(&Pose::default()),
            Err(KitchenError::NotImplemented(_))
        ));
    }

    // ---- evaluate / close ----

    #[test]
    fn evaluate_success_delegates() {
        let env = relax_env();
        assert_eq!(
            env.evaluate_success(&[]),
            Err(EvaluationError::EmptyBatch)
        );
    }

    #[test]
    fn close_returns_backend() {
        let env = relax_env();
        let backend = env.close();
        assert_eq!(backend.ticks(), 10);
    }
}
