//! Compliant end-effector targets.
//!
//! A compliant target is a mocap body joined to a robot link by a weld
//! constraint. The physics engine pulls the link toward the target, so the
//! control layer steers the end effector by moving mocap poses rather than by
//! commanding joints.

use std::collections::HashMap;

use kitchen_core::error::ContractError;
use kitchen_physics::backend::PhysicsBackend;
use kitchen_physics::model::{BodyId, MocapId, NEUTRAL_WELD_DATA, Pose};
use nalgebra::Vector3;
use tracing::debug;

use crate::encoder::TARGET_ROW;

// ---------------------------------------------------------------------------
// WeldTable
// ---------------------------------------------------------------------------

/// One weld between a mocap target and the body it drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeldLink {
    /// Index of the equality constraint in the model.
    pub constraint: usize,
    pub mocap: MocapId,
    pub body: BodyId,
}

/// Bidirectional mocap ↔ body lookup over every weld in a model.
///
/// Built once; welds do not change after model load.
#[derive(Debug, Clone, Default)]
pub struct WeldTable {
    links: Vec<WeldLink>,
    by_mocap: HashMap<MocapId, BodyId>,
    by_body: HashMap<BodyId, MocapId>,
}

impl WeldTable {
    /// Scan `backend`'s equality constraints.
    ///
    /// Either endpoint of a weld may be the mocap body. A weld with no mocap
    /// endpoint is a [`ContractError::MalformedWeld`]. Non-weld constraints
    /// are ignored.
    pub fn from_backend<B: PhysicsBackend + ?Sized>(backend: &B) -> Result<Self, ContractError> {
        let mut table = Self::default();
        for (constraint, eq) in backend.equality_constraints().iter().enumerate() {
            if !eq.is_weld() {
                continue;
            }
            let link = match (backend.body_mocap_id(eq.obj1), backend.body_mocap_id(eq.obj2)) {
                (Some(mocap), _) => WeldLink {
                    constraint,
                    mocap,
                    body: eq.obj2,
                },
                (None, Some(mocap)) => WeldLink {
                    constraint,
                    mocap,
                    body: eq.obj1,
                },
                (None, None) => return Err(ContractError::MalformedWeld { constraint }),
            };
            table.by_mocap.insert(link.mocap, link.body);
            table.by_body.insert(link.body, link.mocap);
            table.links.push(link);
        }
        debug!(welds = table.links.len(), "weld table built");
        Ok(table)
    }

    pub fn body_for(&self, mocap: MocapId) -> Option<BodyId> {
        self.by_mocap.get(&mocap).copied()
    }

    pub fn mocap_for(&self, body: BodyId) -> Option<MocapId> {
        self.by_body.get(&body).copied()
    }

    pub fn links(&self) -> &[WeldLink] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ComplianceTargetTracker
// ---------------------------------------------------------------------------

/// Moves mocap targets and keeps them consistent with their welded bodies.
#[derive(Debug, Clone)]
pub struct ComplianceTargetTracker {
    table: WeldTable,
}

impl ComplianceTargetTracker {
    pub fn new<B: PhysicsBackend + ?Sized>(backend: &B) -> Result<Self, ContractError> {
        Ok(Self {
            table: WeldTable::from_backend(backend)?,
        })
    }

    pub const fn table(&self) -> &WeldTable {
        &self.table
    }

    /// Copy every welded body's current pose onto its mocap target.
    pub fn resync_to_body<B: PhysicsBackend + ?Sized>(&self, backend: &mut B) {
        for link in &self.table.links {
            let pose = backend.body_pose(link.body);
            backend.set_mocap_pose(link.mocap, pose);
        }
    }

    /// Add the position part of each leading target row to its mocap.
    ///
    /// The quaternion part of each row is ignored; target orientation is
    /// whatever the last resync or placement left.
    pub fn apply_delta<B: PhysicsBackend + ?Sized>(
        &self,
        backend: &mut B,
        command: &[f64],
    ) -> Result<(), ContractError> {
        let nmocap = backend.nmocap();
        let needed = TARGET_ROW * nmocap;
        if command.len() < needed {
            return Err(ContractError::ActuationLengthMismatch {
                expected: needed,
                got: command.len(),
            });
        }
        for (i, row) in command[..needed].chunks_exact(TARGET_ROW).enumerate() {
            let mocap = MocapId(i);
            let current = backend.mocap_pose(mocap);
            let delta = Vector3::new(row[0], row[1], row[2]);
            backend.set_mocap_pose(
                mocap,
                Pose::new(current.position + delta, current.orientation),
            );
        }
        Ok(())
    }

    /// Put every weld back to neutral parameters, then run a forward pass so
    /// derived state reflects it.
    pub fn reset_welds<B: PhysicsBackend + ?Sized>(&self, backend: &mut B) {
        for link in &self.table.links {
            backend.set_equality_data(link.constraint, NEUTRAL_WELD_DATA);
        }
        backend.forward();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use kitchen_physics::kinematic::KinematicBackend;
    use kitchen_physics::model::{EqualityConstraint, EqualityKind};
    use kitchen_physics::presets::franka_kitchen;

    fn pose(x: f64, y: f64, z: f64) -> Pose {
        Pose::from_arrays([x, y, z], [1.0, 0.0, 1.0, 0.0])
    }

    // ---- WeldTable ----

    #[test]
    fn table_accepts_either_endpoint_order() {
        for mocap_first in [true, false] {
            let mut b = KinematicBackend::builder(1);
            let hand = b.add_body("hand", pose(0.0, 0.0, 0.0));
            let mocap = b.add_mocap_body("mocap", pose(1.0, 0.0, 0.0));
            if mocap_first {
                b.add_weld(mocap, hand);
            } else {
                b.add_weld(hand, mocap);
            }
            let backend = b.build();
            let table = WeldTable::from_backend(&backend).unwrap();
            assert_eq!(table.len(), 1);
            assert_eq!(table.body_for(MocapId(0)), Some(hand));
            assert_eq!(table.mocap_for(hand), Some(MocapId(0)));
        }
    }

    #[test]
    fn weld_without_mocap_is_malformed() {
        let mut b = KinematicBackend::builder(1);
        let a = b.add_body("a", Pose::default());
        let c = b.add_body("c", Pose::default());
        b.add_weld(a, c);
        let backend = b.build();
        assert_eq!(
            WeldTable::from_backend(&backend).unwrap_err(),
            ContractError::MalformedWeld { constraint: 0 }
        );
    }

    #[test]
    fn non_weld_constraints_are_skipped() {
        let mut b = KinematicBackend::builder(1);
        let a = b.add_body("a", Pose::default());
        let c = b.add_body("c", Pose::default());
        b.add_equality(
            EqualityConstraint {
                kind: EqualityKind::Connect,
                obj1: a,
                obj2: c,
            },
            NEUTRAL_WELD_DATA,
        );
        let backend = b.build();
        assert!(WeldTable::from_backend(&backend).unwrap().is_empty());
    }

    // ---- tracker ----

    #[test]
    fn resync_then_zero_delta_keeps_target() {
        let mut backend = franka_kitchen();
        let tracker = ComplianceTargetTracker::new(&backend).unwrap();
        let link = tracker.table().links()[0];
        backend.set_mocap_pose(link.mocap, pose(5.0, 5.0, 5.0));

        tracker.resync_to_body(&mut backend);
        let synced = backend.mocap_pose(link.mocap);
        assert_eq!(synced, backend.body_pose(link.body));

        tracker.apply_delta(&mut backend, &[0.0; 9]).unwrap();
        assert_eq!(backend.mocap_pose(link.mocap), synced);
    }

    #[test]
    fn delta_moves_position_only() {
        let mut backend = franka_kitchen();
        let tracker = ComplianceTargetTracker::new(&backend).unwrap();
        let before = backend.mocap_pose(MocapId(0));
        let cmd = [0.01, -0.02, 0.03, 0.0, 0.0, 0.0, 1.0, 0.5, 0.5];
        tracker.apply_delta(&mut backend, &cmd).unwrap();
        let after = backend.mocap_pose(MocapId(0));
        assert_relative_eq!(after.position.x - before.position.x, 0.01);
        assert_relative_eq!(after.position.y - before.position.y, -0.02);
        assert_relative_eq!(after.position.z - before.position.z, 0.03);
        assert_eq!(after.orientation, before.orientation);
    }

    #[test]
    fn delta_rejects_short_command() {
        let mut backend = franka_kitchen();
        let tracker = ComplianceTargetTracker::new(&backend).unwrap();
        assert_eq!(
            tracker.apply_delta(&mut backend, &[0.0; 3]),
            Err(ContractError::ActuationLengthMismatch {
                expected: 7,
                got: 3
            })
        );
    }

    #[test]
    fn reset_welds_neutralises_and_forwards() {
        let mut backend = franka_kitchen();
        backend.set_equality_data(0, [0.3, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        let tracker = ComplianceTargetTracker::new(&backend).unwrap();
        let passes = backend.forward_passes();
        tracker.reset_welds(&mut backend);
        assert_eq!(backend.equality_data(0), NEUTRAL_WELD_DATA);
        assert_eq!(backend.forward_passes(), passes + 1);
    }
}
