//! Engine-agnostic physics backend trait.
//!
//! Any physics engine (a MuJoCo binding, the in-crate
//! [`KinematicBackend`](crate::kinematic::KinematicBackend), a test double)
//! implements [`PhysicsBackend`] and is handed to the environment at
//! construction. The control layer only ever talks to the engine through
//! this trait.

use kitchen_core::error::ModelError;
use nalgebra::Vector3;

use crate::model::{ActuatorSpec, BodyId, EqualityConstraint, MocapId, Pose};

/// Trait that concrete physics engines must implement.
///
/// The backend owns the compiled model and the mutable simulation state.
/// It is responsible for:
/// - exposing actuator and equality-constraint declarations
/// - reading joint state and body poses
/// - accepting control signals and mocap target poses
/// - advancing the simulation one tick (`step`) and recomputing derived
///   quantities without advancing time (`forward`)
pub trait PhysicsBackend: Send {
    /// Human-readable engine name (e.g., "mujoco").
    fn name(&self) -> &str;

    // -- model --

    /// Actuator declarations, in control-vector order.
    fn actuators(&self) -> &[ActuatorSpec];

    /// Number of mocap bodies.
    fn nmocap(&self) -> usize;

    /// Declared equality constraints.
    fn equality_constraints(&self) -> &[EqualityConstraint];

    /// Mocap handle of `body`, or `None` if the body is not a mocap body.
    fn body_mocap_id(&self, body: BodyId) -> Option<MocapId>;

    /// Look up a mocap body by name.
    fn mocap_by_name(&self, name: &str) -> Option<MocapId>;

    /// Overwrite the parameters of equality constraint `index`.
    fn set_equality_data(&mut self, index: usize, data: [f64; 7]);

    // -- state --

    fn time(&self) -> f64;

    fn qpos(&self) -> &[f64];

    fn qpos_mut(&mut self) -> &mut [f64];

    fn qvel(&self) -> &[f64];

    /// Replace the full joint state. Lengths must match the model exactly.
    fn set_state(&mut self, qpos: &[f64], qvel: &[f64]) -> Result<(), ModelError>;

    /// Control vector, one entry per actuator.
    fn ctrl_mut(&mut self) -> &mut [f64];

    /// World pose of a body as of the last `forward`/`step`.
    fn body_pose(&self, body: BodyId) -> Pose;

    fn mocap_pose(&self, mocap: MocapId) -> Pose;

    fn set_mocap_pose(&mut self, mocap: MocapId, pose: Pose);

    /// World position of a named site.
    fn site_position(&self, name: &str) -> Result<Vector3<f64>, ModelError>;

    // -- integration --

    /// Advance the simulation by one tick.
    fn step(&mut self);

    /// Recompute derived state (body poses, sites) without advancing time.
    fn forward(&mut self);

    /// Release engine resources. The default does nothing.
    fn close(&mut self) {}

    /// Number of actuators.
    fn nu(&self) -> usize {
        self.actuators().len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
