use thiserror::Error;

/// Top-level error type for the kitchen environment.
#[derive(Debug, Error)]
pub enum KitchenError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Contract violation: {0}")]
    Contract(#[from] ContractError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    /// A task hook was invoked on a variant that does not provide it.
    #[error("Not implemented: {0}")]
    NotImplemented(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid frame_skip: {0} (must be > 0)")]
    InvalidFrameSkip(u32),

    #[error("Goal dimension {goal} must be half the observation dimension {observation}")]
    GoalSpaceMismatch { goal: usize, observation: usize },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Integration contract violations.
///
/// These indicate a caller or model wiring error, never a transient runtime
/// condition, so they are surfaced immediately and never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("Action dimension mismatch: expected {expected}, got {got}")]
    ActionDimMismatch { expected: usize, got: usize },

    #[error("Action contains a non-finite value at dimension {dim}")]
    ActionNotFinite { dim: usize },

    #[error("Actuation command length mismatch: expected {expected}, got {got}")]
    ActuationLengthMismatch { expected: usize, got: usize },

    #[error("Actuator count mismatch: model has {expected} actuators, command has {got}")]
    ActuatorCountMismatch { expected: usize, got: usize },

    #[error("Weld constraint {constraint} has no mocap endpoint")]
    MalformedWeld { constraint: usize },

    #[error("Goal dimension mismatch: expected {expected}, got {got}")]
    GoalDimMismatch { expected: usize, got: usize },

    #[error("Observation dimension mismatch: expected {expected}, got {got}")]
    ObservationDimMismatch { expected: usize, got: usize },
}

/// Errors raised while querying or writing the physics model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Unknown site: {0}")]
    UnknownSite(String),

    #[error("Unknown mocap body: {0}")]
    UnknownMocap(String),

    #[error("State length mismatch for {field}: expected {expected}, got {got}")]
    StateDimMismatch {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Robot wiring requires {required} qpos entries but the model has {available}")]
    InsufficientDofs { required: usize, available: usize },
}

/// Offline rollout evaluation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("Cannot evaluate an empty batch of rollouts")]
    EmptyBatch,

    #[error("Rollout {index} has no recorded steps")]
    EmptyRollout { index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kitchen_error_from_config_error() {
        let err = ConfigError::InvalidFrameSkip(0);
        let kitchen_err: KitchenError = err.into();
        assert!(matches!(kitchen_err, KitchenError::Config(_)));
        assert!(kitchen_err.to_string().contains("frame_skip"));
    }

    #[test]
    fn kitchen_error_from_contract_error() {
        let err = ContractError::MalformedWeld { constraint: 2 };
        let kitchen_err: KitchenError = err.into();
        assert!(matches!(kitchen_err, KitchenError::Contract(_)));
        assert!(kitchen_err.to_string().contains("constraint 2"));
    }

    #[test]
    fn kitchen_error_from_evaluation_error() {
        let kitchen_err: KitchenError = EvaluationError::EmptyBatch.into();
        assert!(matches!(kitchen_err, KitchenError::Evaluation(_)));
    }

    #[test]
    fn config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let config_err: ConfigError = io_err.into();
        assert!(matches!(config_err, ConfigError::Io(_)));
    }

    #[test]
    fn contract_error_is_copy() {
        let err = ContractError::ActionDimMismatch {
            expected: 4,
            got: 3,
        };
        let err2 = err;
        assert_eq!(err, err2);
    }

    #[test]
    fn contract_error_display_messages() {
        assert_eq!(
            ContractError::ActionDimMismatch {
                expected: 4,
                got: 9
            }
            .to_string(),
            "Action dimension mismatch: expected 4, got 9"
        );
        assert_eq!(
            ContractError::ActuatorCountMismatch {
                expected: 2,
                got: 3
            }
            .to_string(),
            "Actuator count mismatch: model has 2 actuators, command has 3"
        );
        assert_eq!(
            ContractError::MalformedWeld { constraint: 0 }.to_string(),
            "Weld constraint 0 has no mocap endpoint"
        );
    }

    #[test]
    fn config_error_display_messages() {
        assert_eq!(
            ConfigError::GoalSpaceMismatch {
                goal: 20,
                observation: 60
            }
            .to_string(),
            "Goal dimension 20 must be half the observation dimension 60"
        );
        assert_eq!(
            ConfigError::InvalidValue {
                field: "noise_ratio".into(),
                message: "must be non-negative".into()
            }
            .to_string(),
            "Invalid value for noise_ratio: must be non-negative"
        );
    }

    #[test]
    fn evaluation_error_display_messages() {
        assert_eq!(
            EvaluationError::EmptyBatch.to_string(),
            "Cannot evaluate an empty batch of rollouts"
        );
        assert_eq!(
            EvaluationError::EmptyRollout { index: 3 }.to_string(),
            "Rollout 3 has no recorded steps"
        );
    }

    #[test]
    fn model_error_display_messages() {
        assert_eq!(
            ModelError::UnknownSite("end_effector".into()).to_string(),
            "Unknown site: end_effector"
        );
        assert_eq!(
            ModelError::StateDimMismatch {
                field: "qpos",
                expected: 30,
                got: 9
            }
            .to_string(),
            "State length mismatch for qpos: expected 30, got 9"
        );
    }
}
