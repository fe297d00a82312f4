//! Observability counters for admission control.
//!
//! Provides metrics about limiter and store behavior for monitoring and
//! debugging. These are process-local counters, not an exported metrics
//! surface; callers wire them into whatever reporting they use.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking admission and artifact staging statistics.
///
/// All counters use atomic operations for thread-safe updates and reads.
/// Cloning is cheap and clones share the same underlying counters.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    /// Requests admitted by the rate limiter
    requests_admitted: AtomicU64,
    /// Requests rejected by the rate limiter
    requests_rejected: AtomicU64,
    /// Expired window records removed by sweeps
    records_swept: AtomicU64,
    /// Artifacts staged in the store
    artifacts_stored: AtomicU64,
    /// Artifacts successfully retrieved (consumed)
    artifacts_retrieved: AtomicU64,
    /// Artifacts removed unretrieved (expired on access or swept)
    artifacts_expired: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_admitted(&self) {
        self.inner.requests_admitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.inner.requests_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_swept(&self, count: u64) {
        self.inner.records_swept.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn record_stored(&self) {
        self.inner.artifacts_stored.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_retrieved(&self) {
        self.inner
            .artifacts_retrieved
            .fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_artifact_expired(&self, count: u64) {
        self.inner
            .artifacts_expired
            .fetch_add(count, Ordering::Relaxed);
    }

    /// Requests admitted by the rate limiter.
    pub fn requests_admitted(&self) -> u64 {
        self.inner.requests_admitted.load(Ordering::Relaxed)
    }

    /// Requests rejected by the rate limiter.
    pub fn requests_rejected(&self) -> u64 {
        self.inner.requests_rejected.load(Ordering::Relaxed)
    }

    /// Expired window records removed by sweeps.
    pub fn records_swept(&self) -> u64 {
        self.inner.records_swept.load(Ordering::Relaxed)
    }

    /// Artifacts staged in the store.
    pub fn artifacts_stored(&self) -> u64 {
        self.inner.artifacts_stored.load(Ordering::Relaxed)
    }

    /// Artifacts successfully retrieved.
    pub fn artifacts_retrieved(&self) -> u64 {
        self.inner.artifacts_retrieved.load(Ordering::Relaxed)
    }

    /// Artifacts that expired before retrieval.
    pub fn artifacts_expired(&self) -> u64 {
        self.inner.artifacts_expired.load(Ordering::Relaxed)
    }

    /// Get a point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_admitted: self.requests_admitted(),
            requests_rejected: self.requests_rejected(),
            records_swept: self.records_swept(),
            artifacts_stored: self.artifacts_stored(),
            artifacts_retrieved: self.artifacts_retrieved(),
            artifacts_expired: self.artifacts_expired(),
        }
    }

    /// Reset all counters to zero.
    ///
    /// Useful for testing or when starting a new monitoring period.
    pub fn reset(&self) {
        self.inner.requests_admitted.store(0, Ordering::Relaxed);
        self.inner.requests_rejected.store(0, Ordering::Relaxed);
        self.inner.records_swept.store(0, Ordering::Relaxed);
        self.inner.artifacts_stored.store(0, Ordering::Relaxed);
        self.inner.artifacts_retrieved.store(0, Ordering::Relaxed);
        self.inner.artifacts_expired.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Requests admitted by the rate limiter
    pub requests_admitted: u64,
    /// Requests rejected by the rate limiter
    pub requests_rejected: u64,
    /// Expired window records removed by sweeps
    pub records_swept: u64,
    /// Artifacts staged in the store
    pub artifacts_stored: u64,
    /// Artifacts successfully retrieved
    pub artifacts_retrieved: u64,
    /// Artifacts that expired before retrieval
    pub artifacts_expired: u64,
}

impl MetricsSnapshot {
    /// Total admission decisions made.
    pub fn total_requests(&self) -> u64 {
        self.requests_admitted
            .saturating_add(self.requests_rejected)
    }

    /// Ratio of rejected requests to total requests (0.0 to 1.0).
    ///
    /// Returns 0.0 if no requests have been observed.
    pub fn rejection_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            0.0
        } else {
            self.requests_rejected as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let metrics = Metrics::new();
        let snapshot = metrics.snapshot();

        assert_eq!(snapshot.total_requests(), 0);
        assert_eq!(snapshot.rejection_rate(), 0.0);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = Metrics::new();
        let clone = metrics.clone();

        metrics.record_admitted();
        clone.record_rejected();

        assert_eq!(metrics.requests_admitted(), 1);
        assert_eq!(metrics.requests_rejected(), 1);
        assert_eq!(clone.snapshot(), metrics.snapshot());
    }

    #[test]
    fn test_rejection_rate() {
        let metrics = Metrics::new();

        metrics.record_admitted();
        metrics.record_admitted();
        metrics.record_admitted();
        metrics.record_rejected();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_requests(), 4);
        assert_eq!(snapshot.rejection_rate(), 0.25);
    }

    #[test]
    fn test_reset() {
        let metrics = Metrics::new();
        metrics.record_stored();
        metrics.record_retrieved();
        metrics.record_swept(3);

        metrics.reset();

        assert_eq!(metrics.artifacts_stored(), 0);
        assert_eq!(metrics.artifacts_retrieved(), 0);
        assert_eq!(metrics.records_swept(), 0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let metrics = Metrics::new();
        metrics.record_admitted();

        let json = serde_json::to_string(&metrics.snapshot()).unwrap();
        assert!(json.contains("\"requests_admitted\":1"));
    }
}
