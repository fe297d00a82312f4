//! Domain layer - pure admission-control logic.
//!
//! This layer contains the core concepts and invariants of the system:
//! - Rate limit policies and the endpoint catalogue
//! - Fixed-window counting state
//! - Artifact sessions and their one-time-use lifecycle
//!
//! All types in this layer are pure and easily testable.

pub mod policy;
pub mod session;
pub mod window;
