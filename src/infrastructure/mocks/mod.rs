//! Mock implementations for testing.

mod clock;

pub use clock::MockClock;
