use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

fn default_model_path() -> PathBuf {
    PathBuf::from("franka/assets/franka_kitchen_jntpos_act_ab.xml")
}
fn default_calibration_path() -> PathBuf {
    PathBuf::from("franka/robot/franka_config.xml")
}
const fn default_frame_skip() -> u32 {
    40
}
const fn default_settle_steps() -> u32 {
    10
}
const fn default_n_dof_robot() -> usize {
    9
}
const fn default_n_dof_object() -> usize {
    21
}
const fn default_noise_ratio() -> f64 {
    0.1
}
fn default_noise_amp() -> Vec<f64> {
    vec![0.1; default_n_dof_robot() + default_n_dof_object()]
}
const fn default_position_gain() -> f64 {
    0.05
}
const fn default_orientation() -> [f64; 4] {
    [1.0, 0.0, 1.0, 0.0]
}
const fn default_action_bound() -> f64 {
    1.0
}
const fn default_true() -> bool {
    true
}
const fn default_goal_dim() -> usize {
    30
}
const fn default_observation_bound() -> f64 {
    8.0
}
fn default_site() -> String {
    "end_effector".into()
}
fn default_mocap() -> String {
    "mocap".into()
}
fn default_controlled_link() -> String {
    "panda0_link7".into()
}
const fn default_target_offset() -> [f64; 3] {
    [-0.498, 0.005, -0.431 + 0.01]
}

/// Joint configuration the arm and the kitchen articulations are restored to
/// on every reset (arm, fingers, then microwave, kettle and slide hinges).
pub const DEFAULT_INIT_QPOS: [f64; 30] = [
    1.483_880_23e-01,
    -1.768_485_73e00,
    1.843_902_96e00,
    -2.476_857_60e00,
    2.602_520_26e-01,
    7.125_331_05e-01,
    1.595_153_94e00,
    4.792_675_05e-02,
    3.713_509_19e-02,
    -2.662_798_50e-04,
    -5.180_434_86e-05,
    3.128_772_20e-05,
    -4.511_998_53e-05,
    -3.908_421_56e-06,
    -4.226_296_55e-05,
    6.280_654_75e-05,
    4.049_847_08e-05,
    4.627_309_39e-04,
    -2.269_064_15e-04,
    -4.655_013_69e-04,
    -6.441_291_96e-03,
    -1.770_482_63e-03,
    1.080_096_84e-03,
    -2.693_974_40e-01,
    3.503_832_55e-01,
    1.619_446_83e00,
    1.006_187_64e00,
    4.063_951_20e-03,
    -6.620_959_97e-03,
    -2.682_789_33e-04,
];

fn default_init_qpos() -> Vec<f64> {
    DEFAULT_INIT_QPOS.to_vec()
}

// ---------------------------------------------------------------------------
// KitchenConfig
// ---------------------------------------------------------------------------

/// Complete environment configuration, loadable from TOML.
///
/// Everything the environment needs at construction lives here; nothing is
/// read from ambient or global state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitchenConfig {
    /// Scene model the physics backend was loaded from. Informational.
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Robot calibration file the noise amplitudes were taken from.
    #[serde(default = "default_calibration_path")]
    pub calibration_path: PathBuf,

    /// Engine ticks per scripted primitive (`grasp`, `rotate_ee`, `goto_pose`).
    #[serde(default = "default_frame_skip")]
    pub frame_skip: u32,

    /// Engine ticks run after placing the mocap target at construction.
    #[serde(default = "default_settle_steps")]
    pub settle_steps: u32,

    /// Seed for observation noise.
    #[serde(default)]
    pub seed: u64,

    #[serde(default)]
    pub robot: RobotConfig,

    #[serde(default)]
    pub action: ActionConfig,

    #[serde(default)]
    pub observation: ObservationConfig,

    #[serde(default)]
    pub end_effector: EndEffectorConfig,

    /// Joint positions restored on reset.
    #[serde(default = "default_init_qpos")]
    pub init_qpos: Vec<f64>,

    /// Joint velocities restored on reset. `None` means all zeros.
    #[serde(default)]
    pub init_qvel: Option<Vec<f64>>,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            calibration_path: default_calibration_path(),
            frame_skip: default_frame_skip(),
            settle_steps: default_settle_steps(),
            seed: 0,
            robot: RobotConfig::default(),
            action: ActionConfig::default(),
            observation: ObservationConfig::default(),
            end_effector: EndEffectorConfig::default(),
            init_qpos: default_init_qpos(),
            init_qvel: None,
        }
    }
}

impl KitchenConfig {
    /// Width of the flat observation: robot joints, object joints, goal.
    pub const fn observation_dim(&self) -> usize {
        self.robot.n_dof_robot + self.robot.n_dof_object + self.observation.goal_dim
    }

    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_skip == 0 {
            return Err(ConfigError::InvalidFrameSkip(self.frame_skip));
        }
        let observation = self.observation_dim();
        if self.observation.goal_dim * 2 != observation {
            return Err(ConfigError::GoalSpaceMismatch {
                goal: self.observation.goal_dim,
                observation,
            });
        }
        self.robot.validate()?;
        self.action.validate()?;
        if !(self.observation.bound.is_finite() && self.observation.bound > 0.0) {
            return Err(invalid(
                "observation.bound",
                format!("must be finite and > 0, got {}", self.observation.bound),
            ));
        }
        let n_dofs = self.robot.n_dofs();
        if self.init_qpos.len() < n_dofs {
            return Err(invalid(
                "init_qpos",
                format!("expected at least {n_dofs} entries, got {}", self.init_qpos.len()),
            ));
        }
        match &self.init_qvel {
            Some(qvel) if qvel.len() < n_dofs => Err(invalid(
                "init_qvel",
                format!("expected at least {n_dofs} entries, got {}", qvel.len()),
            )),
            _ => Ok(()),
        }
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

fn invalid(field: &str, message: String) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.into(),
        message,
    }
}

// ---------------------------------------------------------------------------
// RobotConfig
// ---------------------------------------------------------------------------

/// Robot wiring and sensor noise calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotConfig {
    /// Arm joints plus gripper fingers.
    #[serde(default = "default_n_dof_robot")]
    pub n_dof_robot: usize,
    /// Articulated kitchen object joints following the robot in qpos.
    #[serde(default = "default_n_dof_object")]
    pub n_dof_object: usize,
    /// Fraction of the calibrated noise amplitude applied to observations.
    #[serde(default = "default_noise_ratio")]
    pub noise_ratio: f64,
    /// Per-dof position noise amplitude (robot dofs first, then objects).
    #[serde(default = "default_noise_amp")]
    pub pos_noise_amp: Vec<f64>,
    /// Per-dof velocity noise amplitude (robot dofs first, then objects).
    #[serde(default = "default_noise_amp")]
    pub vel_noise_amp: Vec<f64>,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            n_dof_robot: default_n_dof_robot(),
            n_dof_object: default_n_dof_object(),
            noise_ratio: default_noise_ratio(),
            pos_noise_amp: default_noise_amp(),
            vel_noise_amp: default_noise_amp(),
        }
    }
}

/// Smallest robot the scripted primitives can drive: a wrist joint followed
/// by two finger joints at the end of the robot's qpos block.
pub const MIN_ROBOT_DOFS: usize = 3;

impl RobotConfig {
    /// Total observed dofs.
    pub const fn n_dofs(&self) -> usize {
        self.n_dof_robot + self.n_dof_object
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.n_dof_robot < MIN_ROBOT_DOFS {
            return Err(invalid(
                "robot.n_dof_robot",
                format!(
                    "must be >= {MIN_ROBOT_DOFS} (wrist + two fingers), got {}",
                    self.n_dof_robot
                ),
            ));
        }
        if !(self.noise_ratio.is_finite() && self.noise_ratio >= 0.0) {
            return Err(invalid(
                "robot.noise_ratio",
                format!("must be finite and >= 0, got {}", self.noise_ratio),
            ));
        }
        for (field, amps) in [
            ("robot.pos_noise_amp", &self.pos_noise_amp),
            ("robot.vel_noise_amp", &self.vel_noise_amp),
        ] {
            if amps.len() != self.n_dofs() {
                return Err(invalid(
                    field,
                    format!("expected {} entries, got {}", self.n_dofs(), amps.len()),
                ));
            }
            if amps.iter().any(|a| !a.is_finite() || *a < 0.0) {
                return Err(invalid(field, "amplitudes must be finite and >= 0".into()));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ActionConfig
// ---------------------------------------------------------------------------

/// Task-level action encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionConfig {
    /// Gain applied to the position delta, bounding per-step displacement.
    #[serde(default = "default_position_gain")]
    pub position_gain: f64,
    /// Orientation appended to every command as `(w, x, y, z)`. Not normalized.
    #[serde(default = "default_orientation")]
    pub orientation: [f64; 4],
    /// Symmetric bound actions are clipped to.
    #[serde(default = "default_action_bound")]
    pub bound: f64,
    /// Snap the mocap targets to their welded bodies before every delta,
    /// not only on the first step after reset.
    #[serde(default = "default_true")]
    pub resync_every_step: bool,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            position_gain: default_position_gain(),
            orientation: default_orientation(),
            bound: default_action_bound(),
            resync_every_step: true,
        }
    }
}

impl ActionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.position_gain.is_finite() {
            return Err(invalid(
                "action.position_gain",
                format!("must be finite, got {}", self.position_gain),
            ));
        }
        if !(self.bound.is_finite() && self.bound > 0.0) {
            return Err(invalid(
                "action.bound",
                format!("must be finite and > 0, got {}", self.bound),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ObservationConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationConfig {
    /// Goal vector width; must be half the observation width.
    #[serde(default = "default_goal_dim")]
    pub goal_dim: usize,
    /// Symmetric bound of the declared observation space.
    #[serde(default = "default_observation_bound")]
    pub bound: f64,
}

impl Default for ObservationConfig {
    fn default() -> Self {
        Self {
            goal_dim: default_goal_dim(),
            bound: default_observation_bound(),
        }
    }
}

// ---------------------------------------------------------------------------
// EndEffectorConfig
// ---------------------------------------------------------------------------

/// Names used to wire the compliant end-effector target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndEffectorConfig {
    /// Site the initial gripper target is placed relative to.
    #[serde(default = "default_site")]
    pub site: String,
    /// Mocap body driving the weld.
    #[serde(default = "default_mocap")]
    pub mocap: String,
    /// Link handed to the external end-effector controller.
    #[serde(default = "default_controlled_link")]
    pub controlled_link: String,
    /// Offset from the site to the initial mocap position.
    #[serde(default = "default_target_offset")]
    pub target_offset: [f64; 3],
}

impl Default for EndEffectorConfig {
    fn default() -> Self {
        Self {
            site: default_site(),
            mocap: default_mocap(),
            controlled_link: default_controlled_link(),
            target_offset: default_target_offset(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
