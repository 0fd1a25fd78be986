//! Seam for an external end-effector feedback controller.
//!
//! The environment does not implement impedance or IK control. It only needs
//! to build a controller against the current model, hand it a goal pose and
//! ask for one actuator command per tick.

use kitchen_physics::backend::PhysicsBackend;
use kitchen_physics::model::Pose;

/// A feedback controller driving the end effector toward a goal pose.
pub trait EndEffectorController: Send {
    fn set_goal(&mut self, goal: &Pose);

    /// Control vector for the current tick, one entry per actuator.
    fn command(&mut self, backend: &dyn PhysicsBackend) -> Vec<f64>;

    /// Human-readable name for this controller.
    fn name(&self) -> &str;
}

/// Builds a controller for a specific model.
///
/// Invoked on the first step after construction or reset.
pub trait ControllerFactory: Send {
    fn build(&self, backend: &dyn PhysicsBackend, controlled_link: &str)
    -> Box<dyn EndEffectorController>;
}
