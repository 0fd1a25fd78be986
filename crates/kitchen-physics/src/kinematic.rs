//! [`KinematicBackend`] — an idealised reference engine.
//!
//! There is no contact, gravity or inertia. Each tick:
//! - position-tracking actuators move their joint exactly to the setpoint
//! - direct-drive actuators integrate their control as a unit-inertia
//!   acceleration
//! - every active weld places its driven body on its mocap target (plus the
//!   weld anchor offset)
//!
//! That is enough to exercise the control layer end to end (targets,
//! servos, sites, observation) without a real simulator.

use kitchen_core::error::ModelError;
use nalgebra::Vector3;
use tracing::debug;

use crate::backend::PhysicsBackend;
use crate::model::{
    ActuatorKind, ActuatorSpec, BodyId, EqualityConstraint, MocapId, NEUTRAL_WELD_DATA, Pose,
};

const DEFAULT_TIMESTEP: f64 = 0.002;

#[derive(Clone, Debug)]
struct Body {
    name: String,
    pose: Pose,
    mocap: Option<MocapId>,
}

#[derive(Clone, Debug)]
struct Site {
    name: String,
    body: BodyId,
    offset: Vector3<f64>,
}

// ---------------------------------------------------------------------------
// KinematicModelBuilder
// ---------------------------------------------------------------------------

/// Incrementally declares the model a [`KinematicBackend`] simulates.
#[derive(Clone, Debug)]
pub struct KinematicModelBuilder {
    timestep: f64,
    nq: usize,
    bodies: Vec<Body>,
    mocap_poses: Vec<Pose>,
    actuators: Vec<ActuatorSpec>,
    equality: Vec<EqualityConstraint>,
    eq_data: Vec<[f64; 7]>,
    sites: Vec<Site>,
}

impl KinematicModelBuilder {
    /// Start a model with `nq` position coordinates (and as many velocities).
    pub fn new(nq: usize) -> Self {
        Self {
            timestep: DEFAULT_TIMESTEP,
            nq,
            bodies: vec![Body {
                name: "world".into(),
                pose: Pose::default(),
                mocap: None,
            }],
            mocap_poses: Vec::new(),
            actuators: Vec::new(),
            equality: Vec::new(),
            eq_data: Vec::new(),
            sites: Vec::new(),
        }
    }

    /// Builder: set the tick duration in seconds.
    #[must_use]
    pub const fn with_timestep(mut self, timestep: f64) -> Self {
        self.timestep = timestep;
        self
    }

    /// Add a regular body at `pose`.
    pub fn add_body(&mut self, name: impl Into<String>, pose: Pose) -> BodyId {
        self.bodies.push(Body {
            name: name.into(),
            pose,
            mocap: None,
        });
        BodyId(self.bodies.len() - 1)
    }

    /// Add a mocap body whose pose is set externally.
    pub fn add_mocap_body(&mut self, name: impl Into<String>, pose: Pose) -> BodyId {
        let mocap = MocapId(self.mocap_poses.len());
        self.mocap_poses.push(pose);
        self.bodies.push(Body {
            name: name.into(),
            pose,
            mocap: Some(mocap),
        });
        BodyId(self.bodies.len() - 1)
    }

    /// Add an actuator driving the joint at `kind.qpos_address()`.
    ///
    /// # Panics
    ///
    /// Panics if the address is outside the model's `nq`.
    pub fn add_actuator(&mut self, name: impl Into<String>, kind: ActuatorKind) -> usize {
        assert!(
            kind.qpos_address() < self.nq,
            "actuator qpos address {} out of range (nq = {})",
            kind.qpos_address(),
            self.nq
        );
        let index = self.actuators.len();
        self.actuators.push(ActuatorSpec::new(index, name, kind));
        index
    }

    /// Declare an equality constraint with the given initial parameters.
    pub fn add_equality(&mut self, constraint: EqualityConstraint, data: [f64; 7]) -> usize {
        self.equality.push(constraint);
        self.eq_data.push(data);
        self.equality.len() - 1
    }

    /// Declare a weld between two bodies with neutral parameters.
    pub fn add_weld(&mut self, obj1: BodyId, obj2: BodyId) -> usize {
        self.add_equality(EqualityConstraint::weld(obj1, obj2), NEUTRAL_WELD_DATA)
    }

    /// Attach a site to `body` at a world-aligned offset.
    pub fn add_site(&mut self, name: impl Into<String>, body: BodyId, offset: Vector3<f64>) {
        self.sites.push(Site {
            name: name.into(),
            body,
            offset,
        });
    }

    pub fn build(self) -> KinematicBackend {
        let nsite = self.sites.len();
        let nu = self.actuators.len();
        let mut backend = KinematicBackend {
            timestep: self.timestep,
            time: 0.0,
            qpos: vec![0.0; self.nq],
            qvel: vec![0.0; self.nq],
            ctrl: vec![0.0; nu],
            actuators: self.actuators,
            bodies: self.bodies,
            mocap_poses: self.mocap_poses,
            equality: self.equality,
            eq_data: self.eq_data,
            sites: self.sites,
            site_positions: vec![Vector3::zeros(); nsite],
            forward_passes: 0,
            ticks: 0,
        };
        backend.recompute_sites();
        backend
    }
}

// ---------------------------------------------------------------------------
// KinematicBackend
// ---------------------------------------------------------------------------

/// Idealised physics engine. See the module docs for the tick semantics.
#[derive(Clone, Debug)]
pub struct KinematicBackend {
    timestep: f64,
    time: f64,
    qpos: Vec<f64>,
    qvel: Vec<f64>,
    ctrl: Vec<f64>,
    actuators: Vec<ActuatorSpec>,
    bodies: Vec<Body>,
    mocap_poses: Vec<Pose>,
    equality: Vec<EqualityConstraint>,
    eq_data: Vec<[f64; 7]>,
    sites: Vec<Site>,
    site_positions: Vec<Vector3<f64>>,
    forward_passes: u64,
    ticks: u64,
}

impl KinematicBackend {
    pub fn builder(nq: usize) -> KinematicModelBuilder {
        KinematicModelBuilder::new(nq)
    }

    pub const fn timestep(&self) -> f64 {
        self.timestep
    }

    /// Number of `forward` passes run so far, including those inside `step`.
    pub const fn forward_passes(&self) -> u64 {
        self.forward_passes
    }

    /// Number of ticks advanced so far.
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn ctrl(&self) -> &[f64] {
        &self.ctrl
    }

    /// Current parameters of equality constraint `index`.
    pub fn equality_data(&self, index: usize) -> [f64; 7] {
        self.eq_data[index]
    }

    pub fn body_by_name(&self, name: &str) -> Option<BodyId> {
        self.bodies.iter().position(|b| b.name == name).map(BodyId)
    }

    /// Move a regular body. Mocap bodies are moved with `set_mocap_pose`.
    pub fn set_body_pose(&mut self, body: BodyId, pose: Pose) {
        self.bodies[body.0].pose = pose;
    }

    fn apply_actuators(&mut self) {
        let dt = self.timestep;
        for (spec, &u) in self.actuators.iter().zip(self.ctrl.iter()) {
            match spec.kind {
                ActuatorKind::DirectDrive { qpos_address: a } => {
                    self.qvel[a] += u * dt;
                    self.qpos[a] += self.qvel[a] * dt;
                }
                ActuatorKind::PositionTracking { qpos_address: a } => {
                    self.qvel[a] = (u - self.qpos[a]) / dt;
                    self.qpos[a] = u;
                }
            }
        }
    }

    fn apply_welds(&mut self) {
        for (eq, data) in self.equality.iter().zip(self.eq_data.iter()) {
            if !eq.is_weld() {
                continue;
            }
            let (mocap, driven) = match (self.bodies[eq.obj1.0].mocap, self.bodies[eq.obj2.0].mocap)
            {
                (Some(m), None) => (m, eq.obj2),
                (None, Some(m)) => (m, eq.obj1),
                _ => continue,
            };
            let target = self.mocap_poses[mocap.0];
            let anchor = Vector3::new(data[0], data[1], data[2]);
            self.bodies[driven.0].pose = Pose::new(target.position + anchor, target.orientation);
        }
    }

    fn recompute_sites(&mut self) {
        for (i, site) in self.sites.iter().enumerate() {
            let body = self.body_pose(site.body);
            self.site_positions[i] = body.position + site.offset;
        }
    }
}

impl PhysicsBackend for KinematicBackend {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "kinematic"
    }

    fn actuators(&self) -> &[ActuatorSpec] {
        &self.actuators
    }

    fn nmocap(&self) -> usize {
        self.mocap_poses.len()
    }

    fn equality_constraints(&self) -> &[EqualityConstraint] {
        &self.equality
    }

    fn body_mocap_id(&self, body: BodyId) -> Option<MocapId> {
        self.bodies.get(body.0).and_then(|b| b.mocap)
    }

    fn mocap_by_name(&self, name: &str) -> Option<MocapId> {
        self.bodies
            .iter()
            .find(|b| b.name == name)
            .and_then(|b| b.mocap)
    }

    fn set_equality_data(&mut self, index: usize, data: [f64; 7]) {
        self.eq_data[index] = data;
    }

    fn time(&self) -> f64 {
        self.time
    }

    fn qpos(&self) -> &[f64] {
        &self.qpos
    }

    fn qpos_mut(&mut self) -> &mut [f64] {
        &mut self.qpos
    }

    fn qvel(&self) -> &[f64] {
        &self.qvel
    }

    fn set_state(&mut self, qpos: &[f64], qvel: &[f64]) -> Result<(), ModelError> {
        if qpos.len() != self.qpos.len() {
            return Err(ModelError::StateDimMismatch {
                field: "qpos",
                expected: self.qpos.len(),
                got: qpos.len(),
            });
        }
        if qvel.len() != self.qvel.len() {
            return Err(ModelError::StateDimMismatch {
                field: "qvel",
                expected: self.qvel.len(),
                got: qvel.len(),
            });
        }
        self.qpos.copy_from_slice(qpos);
        self.qvel.copy_from_slice(qvel);
        Ok(())
    }

    fn ctrl_mut(&mut self) -> &mut [f64] {
        &mut self.ctrl
    }

    fn body_pose(&self, body: BodyId) -> Pose {
        let b = &self.bodies[body.0];
        b.mocap.map_or(b.pose, |m| self.mocap_poses[m.0])
    }

    fn mocap_pose(&self, mocap: MocapId) -> Pose {
        self.mocap_poses[mocap.0]
    }

    fn set_mocap_pose(&mut self, mocap: MocapId, pose: Pose) {
        self.mocap_poses[mocap.0] = pose;
    }

    fn site_position(&self, name: &str) -> Result<Vector3<f64>, ModelError> {
        self.sites
            .iter()
            .position(|s| s.name == name)
            .map(|i| self.site_positions[i])
            .ok_or_else(|| ModelError::UnknownSite(name.into()))
    }

    fn step(&mut self) {
        self.apply_actuators();
        self.apply_welds();
        self.time += self.timestep;
        self.ticks += 1;
        self.forward();
    }

    fn forward(&mut self) {
        self.recompute_sites();
        self.forward_passes += 1;
    }

    fn close(&mut self) {
        debug!(ticks = self.ticks, "kinematic backend closed");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
