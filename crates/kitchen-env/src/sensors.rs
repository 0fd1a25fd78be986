//! Robot and object state readout with proportional sensor noise.
//!
//! The reader splits the backend's joint state into a robot block (the
//! first `n_dof_robot` coordinates) and an object block (the last
//! `n_dof_object` coordinates) and perturbs each coordinate by
//! `ratio × amplitude × U(-1, 1)`.

use kitchen_core::config::RobotConfig;
use kitchen_core::error::ModelError;
use kitchen_physics::backend::PhysicsBackend;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Uniform};

// ---------------------------------------------------------------------------
// RobotState
// ---------------------------------------------------------------------------

/// One (possibly noisy) snapshot of the scene's joint state.
#[derive(Debug, Clone, PartialEq)]
pub struct RobotState {
    pub time: f64,
    pub qp: Vec<f64>,
    pub qv: Vec<f64>,
    pub obj_qp: Vec<f64>,
    pub obj_qv: Vec<f64>,
}

// ---------------------------------------------------------------------------
// RobotStateReader
// ---------------------------------------------------------------------------

/// Reads [`RobotState`] from a backend.
///
/// Owns its own RNG so noise is reproducible per seed.
pub struct RobotStateReader {
    n_dof_robot: usize,
    n_dof_object: usize,
    pos_noise_amp: Vec<f64>,
    vel_noise_amp: Vec<f64>,
    unit: Uniform<f64>,
    rng: ChaCha8Rng,
}

impl RobotStateReader {
    pub fn new(config: &RobotConfig, seed: u64) -> Self {
        Self {
            n_dof_robot: config.n_dof_robot,
            n_dof_object: config.n_dof_object,
            pos_noise_amp: config.pos_noise_amp.clone(),
            vel_noise_amp: config.vel_noise_amp.clone(),
            unit: Uniform::new_inclusive(-1.0, 1.0),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Restart the noise stream from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Coordinates the backend must expose.
    pub const fn required_dofs(&self) -> usize {
        self.n_dof_robot + self.n_dof_object
    }

    /// Read the current state with `noise_ratio` applied.
    pub fn read<B: PhysicsBackend + ?Sized>(
        &mut self,
        backend: &B,
        noise_ratio: f64,
    ) -> Result<RobotState, ModelError> {
        let qpos = backend.qpos();
        let qvel = backend.qvel();
        let available = qpos.len().min(qvel.len());
        if available < self.required_dofs() {
            return Err(ModelError::InsufficientDofs {
                required: self.required_dofs(),
                available,
            });
        }

        let nr = self.n_dof_robot;
        let obj_pos = qpos.len() - self.n_dof_object;
        let obj_vel = qvel.len() - self.n_dof_object;
        let amp_obj = self.pos_noise_amp.len() - self.n_dof_object;

        let qp = self.perturb(&qpos[..nr], Amp::Pos, 0, noise_ratio);
        let qv = self.perturb(&qvel[..nr], Amp::Vel, 0, noise_ratio);
        let obj_qp = self.perturb(&qpos[obj_pos..], Amp::Pos, amp_obj, noise_ratio);
        let obj_qv = self.perturb(&qvel[obj_vel..], Amp::Vel, amp_obj, noise_ratio);

        Ok(RobotState {
            time: backend.time(),
            qp,
            qv,
            obj_qp,
            obj_qv,
        })
    }

    fn perturb(&mut self, values: &[f64], amp: Amp, offset: usize, ratio: f64) -> Vec<f64> {
        let Self {
            pos_noise_amp,
            vel_noise_amp,
            unit,
            rng,
            ..
        } = self;
        let amps = match amp {
            Amp::Pos => &pos_noise_amp[offset..],
            Amp::Vel => &vel_noise_amp[offset..],
        };
        values
            .iter()
            .zip(amps)
            .map(|(v, a)| v + ratio * a * unit.sample(&mut *rng))
            .collect()
    }
}

#[derive(Clone, Copy)]
enum Amp {
    Pos,
    Vel,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
