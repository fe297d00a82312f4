//! One-time staging of generated binary artifacts.
//!
//! Bridges the request/response mismatch between "generate a PDF now" and
//! "download it in a separate request": the producing handler stages the
//! bytes and hands its client a session id; the download handler consumes
//! the session exactly once. Sessions expire after a fixed TTL (5 minutes by
//! default) and a miss is deliberately uninformative, collapsing
//! never-existed, already-consumed and expired into one `None`.

use crate::application::metrics::Metrics;
use crate::application::ports::{Clock, Storage};
use crate::domain::session::{ArtifactSession, SessionId};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default session lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Read-only view of a live session, for operational diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionOverview {
    /// The session id.
    pub session_id: SessionId,
    /// Suggested file name of the staged artifact.
    pub file_name: String,
    /// Seconds since the session was created.
    pub age_secs: u64,
}

/// Ephemeral store for generated artifacts, keyed by one-time session ids.
///
/// Retrieval is destructive: the first successful [`retrieve`] removes the
/// session, and any later attempt observes `None`, indistinguishable from
/// expiry. Expired sessions are dropped lazily on access and by
/// [`sweep_expired`].
///
/// [`retrieve`]: Self::retrieve
/// [`sweep_expired`]: Self::sweep_expired
///
/// # Example
/// ```
/// use costguard::ArtifactStore;
///
/// let store = ArtifactStore::in_memory();
/// let id = store.store(vec![0x25, 0x50, 0x44, 0x46], "cv.pdf");
///
/// let session = store.retrieve(&id).expect("just stored");
/// assert_eq!(session.file_name(), "cv.pdf");
///
/// // One-time use: a second retrieval misses
/// assert!(store.retrieve(&id).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ArtifactStore<S>
where
    S: Storage<SessionId, ArtifactSession> + Clone,
{
    storage: S,
    clock: Arc<dyn Clock>,
    metrics: Metrics,
    ttl: Duration,
}

impl<S> ArtifactStore<S>
where
    S: Storage<SessionId, ArtifactSession> + Clone,
{
    /// Create a store over the given storage and clock with the default TTL.
    pub fn new(storage: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            metrics: Metrics::new(),
            ttl: DEFAULT_TTL,
        }
    }

    /// Override the session TTL.
    ///
    /// # Panics
    /// Panics if `ttl` is zero; a session that can never be retrieved is a
    /// programmer error.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        assert!(!ttl.is_zero(), "artifact session TTL must not be zero");
        self.ttl = ttl;
        self
    }

    /// Share an existing metrics tracker (e.g. with a [`RateLimiter`]).
    ///
    /// [`RateLimiter`]: crate::application::limiter::RateLimiter
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Stage an artifact and return its one-time session id.
    ///
    /// The id is a fresh random UUID; embed it in the download URL handed
    /// back to the client. Storing never fails.
    ///
    /// # Panics
    /// Panics if `file_name` is empty.
    pub fn store(&self, payload: Vec<u8>, file_name: impl Into<String>) -> SessionId {
        let file_name = file_name.into();
        assert!(!file_name.is_empty(), "artifact file name must not be empty");

        let id = SessionId::generate();
        let now = self.clock.now();
        let bytes = payload.len();
        self.storage
            .insert(id, ArtifactSession::new(payload, file_name, now, self.ttl));

        self.metrics.record_stored();
        debug!(session_id = %id, bytes, "staged artifact");
        id
    }

    /// Consume a session, returning the staged artifact if it is still live.
    ///
    /// The entry is removed atomically, so of two racing calls exactly one
    /// wins. A `None` collapses never-existed, already-consumed and expired
    /// by design; callers respond with a generic "regenerate and retry"
    /// message rather than probing which it was.
    pub fn retrieve(&self, id: &SessionId) -> Option<ArtifactSession> {
        let session = self.storage.remove(id)?;

        if session.is_expired(self.clock.now()) {
            // Stale entry: leave it deleted, report a miss
            self.metrics.record_artifact_expired(1);
            debug!(session_id = %id, "artifact session expired before retrieval");
            return None;
        }

        self.metrics.record_retrieved();
        debug!(session_id = %id, bytes = session.payload().len(), "artifact retrieved");
        Some(session)
    }

    /// List live sessions without consuming them or disturbing their TTL.
    pub fn snapshot(&self) -> Vec<SessionOverview> {
        let now = self.clock.now();
        let mut overviews = Vec::new();

        self.storage.for_each(|id, session| {
            if !session.is_expired(now) {
                overviews.push(SessionOverview {
                    session_id: *id,
                    file_name: session.file_name().to_owned(),
                    age_secs: session.age(now).as_secs(),
                });
            }
        });
        overviews
    }

    /// Remove every expired session, returning how many were dropped.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.storage.len();
        self.storage.retain(|_, session| !session.is_expired(now));
        let swept = before.saturating_sub(self.storage.len());

        if swept > 0 {
            self.metrics.record_artifact_expired(swept as u64);
            debug!(swept, "removed expired artifact sessions");
        }
        swept
    }

    /// Number of sessions currently held, expired ones included.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if the store holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Get a reference to the clock.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}
