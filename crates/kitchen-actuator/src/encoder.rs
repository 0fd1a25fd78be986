//! Task-level action encoding.
//!
//! The agent acts in a 4-d space: a Cartesian position delta for the end
//! effector plus one gripper channel. [`ActionEncoder`] expands that into the
//! 9-vector [`ActuationCommand`] the dispatcher and the compliance tracker
//! consume: `[dx, dy, dz, qw, qx, qy, qz, grip, grip]`.

use kitchen_core::config::ActionConfig;
use kitchen_core::error::ContractError;
use kitchen_core::types::validate_action;

/// Width of one compliant-target row: position (3) + quaternion (4).
pub const TARGET_ROW: usize = 7;

// ---------------------------------------------------------------------------
// ActuationCommand
// ---------------------------------------------------------------------------

/// Raw actuation command.
///
/// The leading `7 × nmocap` entries are compliant-target rows, the rest are
/// per-actuator signals.
#[derive(Debug, Clone, PartialEq)]
pub struct ActuationCommand(Vec<f64>);

impl ActuationCommand {
    pub const fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub const fn len(&self) -> usize {
        self.0.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }
}

impl From<Vec<f64>> for ActuationCommand {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

// ---------------------------------------------------------------------------
// ActionEncoder
// ---------------------------------------------------------------------------

/// Expands a 4-d task action into a 9-d actuation command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionEncoder {
    position_gain: f64,
    orientation: [f64; 4],
}

impl ActionEncoder {
    /// Width of the task action.
    pub const ACTION_DIM: usize = 4;
    /// Width of the encoded command (one target row + two finger servos).
    pub const COMMAND_DIM: usize = TARGET_ROW + 2;

    pub const fn new(position_gain: f64, orientation: [f64; 4]) -> Self {
        Self {
            position_gain,
            orientation,
        }
    }

    pub const fn from_config(config: &ActionConfig) -> Self {
        Self::new(config.position_gain, config.orientation)
    }

    pub const fn position_gain(&self) -> f64 {
        self.position_gain
    }

    pub const fn orientation(&self) -> [f64; 4] {
        self.orientation
    }

    /// Encode `action` (`[dx, dy, dz, grip]`).
    ///
    /// The action is expected to be clipped already; only its width and
    /// finiteness are checked here.
    pub fn encode(&self, action: &[f64]) -> Result<ActuationCommand, ContractError> {
        validate_action(action, Self::ACTION_DIM)?;
        let g = self.position_gain;
        let grip = action[3];

        let mut out = Vec::with_capacity(Self::COMMAND_DIM);
        out.extend(action[..3].iter().map(|d| d * g));
        out.extend_from_slice(&self.orientation);
        out.extend([grip, grip]);
        Ok(ActuationCommand(out))
    }
}

impl Default for ActionEncoder {
    fn default() -> Self {
        Self::from_config(&ActionConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
