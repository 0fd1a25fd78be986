//! Shared test fixtures and utilities for the kitchen crates.
//!
//! Provides ready-built environments, mock task scoring, goal samplers and
//! controllers, and deterministic RNG setup.

pub mod env;
pub mod mocks;
pub mod rng;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use env::{kitchen_env_with, quiet_config, relax_env};
pub use rng::{deterministic_action, seeded_rng};
