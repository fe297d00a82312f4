//! Application layer - orchestration of domain logic.
//!
//! This layer coordinates the domain logic and manages runtime behavior:
//! - Rate limiter (admission decisions)
//! - Artifact store (one-time staging of generated binaries)
//! - Expiry sweeping (bounded memory without correctness dependence)
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the application layer independent
//! from infrastructure details.

pub mod limiter;
pub mod metrics;
pub mod ports;
pub mod store;
pub mod sweeper;
