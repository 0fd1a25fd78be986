//! Action encoding and actuation for the kitchen environment.
//!
//! Pure Rust over the [`PhysicsBackend`](kitchen_physics::backend::PhysicsBackend)
//! seam. One environment step flows through three stages:
//!
//! ```text
//! action (4) → ActionEncoder → ActuationCommand (9)
//!                                 ├─ target rows → ComplianceTargetTracker → mocap poses
//!                                 └─ the rest    → ActuatorDispatcher      → ctrl
//! ```

pub mod compliance;
pub mod dispatch;
pub mod encoder;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::compliance::{ComplianceTargetTracker, WeldLink, WeldTable};
    pub use crate::dispatch::{ActuatorDispatcher, control_signals};
    pub use crate::encoder::{ActionEncoder, ActuationCommand, TARGET_ROW};
}
