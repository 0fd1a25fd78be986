//! Actuation command → per-actuator control signals.
//!
//! Two actuator families are supported:
//!
//! | Kind | Control signal |
//! |------|----------------|
//! | `DirectDrive` | the command, verbatim |
//! | `PositionTracking` | measured `qpos[address]` + command |
//!
//! A zero command on a position-tracking actuator therefore holds the joint
//! where it currently is.

use kitchen_core::error::ContractError;
use kitchen_physics::backend::PhysicsBackend;
use kitchen_physics::model::{ActuatorKind, ActuatorSpec};

use crate::encoder::TARGET_ROW;

/// Compute control signals for `specs` from the actuator part of a command.
///
/// `command` must already have the compliant-target slice stripped.
pub fn control_signals(
    command: &[f64],
    specs: &[ActuatorSpec],
    qpos: &[f64],
) -> Result<Vec<f64>, ContractError> {
    if command.len() != specs.len() {
        return Err(ContractError::ActuatorCountMismatch {
            expected: specs.len(),
            got: command.len(),
        });
    }
    Ok(specs
        .iter()
        .zip(command)
        .map(|(spec, &u)| match spec.kind {
            ActuatorKind::DirectDrive { .. } => u,
            ActuatorKind::PositionTracking { qpos_address } => qpos[qpos_address] + u,
        })
        .collect())
}

/// Writes actuation commands into a backend's control vector.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActuatorDispatcher;

impl ActuatorDispatcher {
    /// Full command width a backend expects: `nu + 7 × nmocap`.
    pub fn expected_len<B: PhysicsBackend + ?Sized>(backend: &B) -> usize {
        backend.nu() + TARGET_ROW * backend.nmocap()
    }

    /// Reject a command whose total width does not match the model.
    pub fn check_len<B: PhysicsBackend + ?Sized>(
        backend: &B,
        command: &[f64],
    ) -> Result<(), ContractError> {
        let expected = Self::expected_len(backend);
        if command.len() == expected {
            Ok(())
        } else {
            Err(ContractError::ActuationLengthMismatch {
                expected,
                got: command.len(),
            })
        }
    }

    /// Strip the compliant-target rows from `command` and write the rest to
    /// the backend's controls.
    ///
    /// Nothing is written if the remaining width differs from the actuator
    /// count.
    pub fn apply<B: PhysicsBackend + ?Sized>(
        backend: &mut B,
        command: &[f64],
    ) -> Result<(), ContractError> {
        let skip = (TARGET_ROW * backend.nmocap()).min(command.len());
        let signals = control_signals(&command[skip..], backend.actuators(), backend.qpos())?;
        backend.ctrl_mut().copy_from_slice(&signals);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
