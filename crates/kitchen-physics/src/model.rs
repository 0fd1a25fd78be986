//! Static model records the control layer reads from a physics backend.
//!
//! These mirror what a MuJoCo-style compiled model exposes: actuators with
//! their transmission target, equality constraints between body pairs, and
//! the body → mocap mapping.

use nalgebra::{Quaternion, Vector3};

// ---------------------------------------------------------------------------
// Ids
// ---------------------------------------------------------------------------

/// Index of a body in the compiled model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub usize);

/// Index of a mocap (virtual target) body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MocapId(pub usize);

// ---------------------------------------------------------------------------
// Actuators
// ---------------------------------------------------------------------------

/// How an actuator interprets its control signal.
///
/// Both families drive a single joint; the qpos address is the first
/// position coordinate of that joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorKind {
    /// Control is applied as a raw effort (torque or force).
    DirectDrive { qpos_address: usize },
    /// Control is a servo setpoint; commands are deltas on the measured
    /// joint position.
    PositionTracking { qpos_address: usize },
}

impl ActuatorKind {
    /// Address of the driven joint's position coordinate.
    pub const fn qpos_address(self) -> usize {
        match self {
            Self::DirectDrive { qpos_address } | Self::PositionTracking { qpos_address } => {
                qpos_address
            }
        }
    }
}

/// Per-actuator metadata. Immutable after model load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActuatorSpec {
    pub index: usize,
    pub name: String,
    pub kind: ActuatorKind,
}

impl ActuatorSpec {
    pub fn new(index: usize, name: impl Into<String>, kind: ActuatorKind) -> Self {
        Self {
            index,
            name: name.into(),
            kind,
        }
    }
}

// ---------------------------------------------------------------------------
// Equality constraints
// ---------------------------------------------------------------------------

/// Equality constraint families. Only welds matter to the control layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EqualityKind {
    Connect,
    Weld,
    Joint,
    Tendon,
}

/// Declared equality constraint between two bodies.
///
/// Endpoints are symmetric: for a weld either one may be the mocap target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EqualityConstraint {
    pub kind: EqualityKind,
    pub obj1: BodyId,
    pub obj2: BodyId,
}

impl EqualityConstraint {
    pub const fn weld(obj1: BodyId, obj2: BodyId) -> Self {
        Self {
            kind: EqualityKind::Weld,
            obj1,
            obj2,
        }
    }

    pub const fn is_weld(&self) -> bool {
        matches!(self.kind, EqualityKind::Weld)
    }
}

/// Weld parameters with no offset and identity relative orientation:
/// `[anchor (3), relative quaternion (4)]`.
pub const NEUTRAL_WELD_DATA: [f64; 7] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];

// ---------------------------------------------------------------------------
// Pose
// ---------------------------------------------------------------------------

/// World-frame position and orientation of a body or mocap target.
///
/// The quaternion is stored as given, without normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vector3<f64>,
    pub orientation: Quaternion<f64>,
}

impl Pose {
    pub const fn new(position: Vector3<f64>, orientation: Quaternion<f64>) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Build from a position and a `(w, x, y, z)` quaternion.
    pub fn from_arrays(position: [f64; 3], wxyz: [f64; 4]) -> Self {
        Self {
            position: Vector3::from(position),
            orientation: Quaternion::new(wxyz[0], wxyz[1], wxyz[2], wxyz[3]),
        }
    }

    /// Orientation as `(w, x, y, z)`.
    pub fn wxyz(&self) -> [f64; 4] {
        let q = &self.orientation;
        [q.w, q.i, q.j, q.k]
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            orientation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
