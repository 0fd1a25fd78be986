use crate::types::Observation;

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// A policy that maps observations to task-level actions.
///
/// Takes `&mut self` so stateful policies (seeded RNGs, scripted cursors)
/// need no interior mutability; environments are driven from one thread.
pub trait Policy: Send {
    /// Given an observation, produce an action.
    fn get_action(&mut self, obs: &Observation) -> Vec<f64>;

    /// Human-readable name for this policy.
    fn name(&self) -> &str;

    /// Whether this policy is deterministic (no randomness).
    fn is_deterministic(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
