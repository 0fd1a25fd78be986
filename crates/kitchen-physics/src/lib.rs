// kitchen-physics: Engine-agnostic physics seam for the kitchen environment.
//
// Provides a `PhysicsBackend` trait so the concrete engine can be swapped
// without changing the control layer, the model records the control layer
// reads (actuators, equality constraints, poses), and an idealised
// `KinematicBackend` with a Franka kitchen preset for tests and headless
// runs.

pub mod backend;
pub mod kinematic;
pub mod model;
pub mod presets;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        backend::PhysicsBackend,
        kinematic::{KinematicBackend, KinematicModelBuilder},
        model::{
            ActuatorKind, ActuatorSpec, BodyId, EqualityConstraint, EqualityKind, MocapId,
            NEUTRAL_WELD_DATA, Pose,
        },
        presets::franka_kitchen,
    };
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
