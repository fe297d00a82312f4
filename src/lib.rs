//! # costguard
//!
//! In-process admission control for costly external APIs: fixed-window rate
//! limiting plus one-time staging of generated binary artifacts.
//!
//! Backends that front expensive third-party endpoints (speech synthesis,
//! transcription, chat completion) need two small pieces of machinery:
//!
//! - A **rate limiter** that admits or rejects each call per
//!   `(category, principal)` key under a fixed-window counting scheme, and
//!   tells rejected callers how long to wait.
//! - An **artifact store** that bridges a request/response mismatch: one
//!   handler renders a document and stages the bytes, a separate download
//!   request fetches them exactly once before a 5-minute TTL.
//!
//! Both are process-local, in-memory tables with lazy expiry. They are
//! constructed explicitly and injected into handlers, never reached through
//! a global.
//!
//! ## Quick Start
//!
//! ```rust
//! use costguard::{catalog, principal_key, ArtifactStore, RateLimiter};
//!
//! let limiter = RateLimiter::in_memory();
//! let store = ArtifactStore::in_memory();
//!
//! // Gate a call to the speech synthesis API for one user:
//! let key = principal_key("speak", "user-42");
//! match limiter.check_and_consume(&key, &catalog::SPEAK) {
//!     Ok(()) => { /* call the upstream API */ }
//!     Err(rejected) => {
//!         // Respond 429 with Retry-After: rejected.retry_after_secs
//!     }
//! }
//!
//! // Stage a rendered PDF; the client downloads it with the session id:
//! let id = store.store(vec![0x25, 0x50, 0x44, 0x46], "cv.pdf");
//! let session = store.retrieve(&id).expect("first retrieval wins");
//! assert!(store.retrieve(&id).is_none()); // one-time use
//! ```
//!
//! ## Admission semantics
//!
//! Each key owns one window record. The first request (or the first after
//! the window elapses) opens a fresh window counting it as request one;
//! requests are admitted until the policy's `max_requests`, then rejected
//! with `retry_after_secs = ceil(time_until_reset)`. The check and the
//! increment happen under the storage entry lock, so concurrent callers can
//! never both take the last slot.
//!
//! ## Retrieval semantics
//!
//! [`ArtifactStore::retrieve`] is consume-on-read: the entry is removed
//! atomically, and a miss collapses never-existed, already-consumed and
//! expired into one `None`. Callers must not try to distinguish them; the
//! right client response is always "regenerate and retry".
//!
//! ## Expiry
//!
//! Expired entries are dropped lazily (on access), opportunistically (a
//! random 1% of limiter calls sweep the table), and optionally on a timer
//! via [`ExpirySweeper`] (feature `async`, enabled by default). None of the
//! §8-style correctness properties depend on sweep timing.
//!
//! ## Scaling out
//!
//! Tables are per process: N instances hold N independent tables, so a
//! caller's requests landing on different instances are neither limited nor
//! correlated consistently. Both components are written against the
//! [`Storage`] and [`Clock`] ports so an externally shared keyed store can
//! be substituted without touching call sites.
//!
//! ## Testing
//!
//! Enable the `test-helpers` feature to get `MockClock`
//! (`infrastructure::mocks::MockClock`) and drive window expiry and TTLs
//! deterministically.

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    missing_debug_implementations
)]

// Domain layer - pure business logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - adapters
pub mod infrastructure;

use std::sync::Arc;

// Re-export commonly used types for convenience
pub use domain::{
    policy::{catalog, principal_key, PolicyError, RateLimitPolicy},
    session::{ArtifactSession, SessionId},
    window::{Admission, WindowState},
};

pub use application::{
    limiter::{RateLimited, RateLimiter, DEFAULT_SWEEP_PROBABILITY},
    metrics::{Metrics, MetricsSnapshot},
    ports::{Clock, Storage},
    store::{ArtifactStore, SessionOverview, DEFAULT_TTL},
    sweeper::{ExpirySweeper, SweepConfig, SweepConfigError, SweepReport},
};

pub use infrastructure::{clock::SystemClock, storage::ShardedStorage};

/// Shared in-memory storage table.
pub type InMemoryStorage<K, V> = Arc<ShardedStorage<K, V>>;

/// A rate limiter over the default in-memory storage.
pub type InMemoryRateLimiter = RateLimiter<InMemoryStorage<String, WindowState>>;

/// An artifact store over the default in-memory storage.
pub type InMemoryArtifactStore = ArtifactStore<InMemoryStorage<SessionId, ArtifactSession>>;

impl InMemoryRateLimiter {
    /// Create a limiter over a fresh in-memory table and the system clock.
    pub fn in_memory() -> Self {
        RateLimiter::new(Arc::new(ShardedStorage::new()), Arc::new(SystemClock::new()))
    }
}

impl InMemoryArtifactStore {
    /// Create a store over a fresh in-memory table and the system clock.
    pub fn in_memory() -> Self {
        ArtifactStore::new(Arc::new(ShardedStorage::new()), Arc::new(SystemClock::new()))
    }
}
