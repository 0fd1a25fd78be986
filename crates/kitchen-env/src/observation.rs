//! Goal-conditioned observation assembly.

use kitchen_core::error::ContractError;
use kitchen_core::types::Observation;
use serde::{Deserialize, Serialize};

use crate::sensors::RobotState;

/// Named view of the last observation, handed to task scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationDict {
    pub time: f64,
    pub joint_pos: Vec<f64>,
    pub joint_vel: Vec<f64>,
    pub object_pos: Vec<f64>,
    pub object_vel: Vec<f64>,
    pub goal: Vec<f64>,
}

impl ObservationDict {
    /// Flat observation: `joint_pos ‖ object_pos ‖ goal`.
    pub fn flatten(&self) -> Observation {
        let mut data =
            Vec::with_capacity(self.joint_pos.len() + self.object_pos.len() + self.goal.len());
        data.extend_from_slice(&self.joint_pos);
        data.extend_from_slice(&self.object_pos);
        data.extend_from_slice(&self.goal);
        Observation::new(data)
    }
}

/// Builds [`ObservationDict`]s and checks the flat width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationAssembler {
    observation_dim: usize,
}

impl ObservationAssembler {
    pub const fn new(observation_dim: usize) -> Self {
        Self { observation_dim }
    }

    pub const fn observation_dim(&self) -> usize {
        self.observation_dim
    }

    /// Combine a state snapshot with the current goal.
    ///
    /// Noise is already in `state`; the assembler does not add any.
    pub fn assemble(
        &self,
        state: RobotState,
        goal: &[f64],
    ) -> Result<(ObservationDict, Observation), ContractError> {
        let got = state.qp.len() + state.obj_qp.len() + goal.len();
        if got != self.observation_dim {
            return Err(ContractError::ObservationDimMismatch {
                expected: self.observation_dim,
                got,
            });
        }
        let dict = ObservationDict {
            time: state.time,
            joint_pos: state.qp,
            joint_vel: state.qv,
            object_pos: state.obj_qp,
            object_vel: state.obj_qv,
            goal: goal.to_vec(),
        };
        let flat = dict.flatten();
        Ok((dict, flat))
    }
}
