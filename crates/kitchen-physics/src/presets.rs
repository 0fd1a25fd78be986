//! Ready-made kinematic models.

use nalgebra::Vector3;

use crate::kinematic::KinematicBackend;
use crate::model::{ActuatorKind, Pose};

/// Position coordinates in the Franka kitchen scene: 9 robot + 21 object.
pub const FRANKA_KITCHEN_NQ: usize = 30;

/// Tick length of the kitchen scene, in seconds.
pub const FRANKA_KITCHEN_TIMESTEP: f64 = 0.002;

/// Franka Panda in the kitchen scene, reduced to what the control layer
/// touches.
///
/// - two position-tracking finger servos on qpos 7 and 8
/// - a mocap target `"mocap"` welded to the wrist link `"panda0_link7"`,
///   declared body-first so the weld table has to search both endpoints
/// - an `"end_effector"` site 0.1 m below the wrist
pub fn franka_kitchen() -> KinematicBackend {
    let hand_pose = Pose::from_arrays([-0.269, 0.5, 2.2], [1.0, 0.0, 1.0, 0.0]);

    let mut b = KinematicBackend::builder(FRANKA_KITCHEN_NQ).with_timestep(FRANKA_KITCHEN_TIMESTEP);
    let link7 = b.add_body("panda0_link7", hand_pose);
    let mocap = b.add_mocap_body("mocap", hand_pose);
    b.add_weld(link7, mocap);
    b.add_site("end_effector", link7, Vector3::new(0.0, 0.0, -0.1));
    b.add_actuator(
        "panda0_finger_joint1",
        ActuatorKind::PositionTracking { qpos_address: 7 },
    );
    b.add_actuator(
        "panda0_finger_joint2",
        ActuatorKind::PositionTracking { qpos_address: 8 },
    );
    b.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::PhysicsBackend;
    use crate::model::MocapId;

    #[test]
    fn franka_kitchen_layout() {
        let backend = franka_kitchen();
        assert_eq!(backend.qpos().len(), FRANKA_KITCHEN_NQ);
        assert_eq!(backend.nu(), 2);
        assert_eq!(backend.nmocap(), 1);
        assert_eq!(backend.equality_constraints().len(), 1);
        assert_eq!(backend.mocap_by_name("mocap"), Some(MocapId(0)));
        assert!(backend.site_position("end_effector").is_ok());
    }

    #[test]
    fn weld_is_declared_body_first() {
        let backend = franka_kitchen();
        let eq = backend.equality_constraints()[0];
        assert_eq!(backend.body_mocap_id(eq.obj1), None);
        assert_eq!(backend.body_mocap_id(eq.obj2), Some(MocapId(0)));
    }
}
