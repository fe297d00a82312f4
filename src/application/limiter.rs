//! Fixed-window rate limiting for costly external endpoints.
//!
//! The limiter gates calls to expensive or abuse-prone upstream APIs (speech
//! synthesis, transcription, chat completion) per identifying key. A
//! rejection is an expected backpressure signal, not a defect; callers
//! translate it into an HTTP 429 with a `Retry-After` header.

use crate::application::metrics::Metrics;
use crate::application::ports::{Clock, Storage};
use crate::domain::policy::RateLimitPolicy;
use crate::domain::window::{retry_after_secs, Admission, WindowState};
use std::sync::Arc;
use tracing::debug;

/// Fraction of calls that trigger an opportunistic sweep of expired records.
pub const DEFAULT_SWEEP_PROBABILITY: f64 = 0.01;

/// Backpressure signal: the key has exhausted its window.
///
/// Carries the whole-second delay the caller should surface to its client
/// (e.g. as a `Retry-After` header). Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimited {
    /// Whole seconds until the window resets.
    pub retry_after_secs: u64,
}

impl std::fmt::Display for RateLimited {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "too many requests, retry after {}s",
            self.retry_after_secs
        )
    }
}

impl std::error::Error for RateLimited {}

/// Admission control under a fixed-window counting scheme.
///
/// Keys identify a principal on an endpoint category (see
/// [`principal_key`](crate::domain::policy::principal_key)); each key counts
/// independently. The check-then-increment runs under the storage entry
/// lock, so two racing callers can never both take the last slot.
///
/// # Example
/// ```
/// use costguard::{catalog, principal_key, RateLimiter};
///
/// let limiter = RateLimiter::in_memory();
/// let key = principal_key("speak", "user-42");
///
/// match limiter.check_and_consume(&key, &catalog::SPEAK) {
///     Ok(()) => { /* call the upstream API */ }
///     Err(rejected) => {
///         // respond 429, Retry-After: rejected.retry_after_secs
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RateLimiter<S>
where
    S: Storage<String, WindowState> + Clone,
{
    storage: S,
    clock: Arc<dyn Clock>,
    metrics: Metrics,
    sweep_probability: f64,
}

impl<S> RateLimiter<S>
where
    S: Storage<String, WindowState> + Clone,
{
    /// Create a limiter over the given storage and clock.
    pub fn new(storage: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            metrics: Metrics::new(),
            sweep_probability: DEFAULT_SWEEP_PROBABILITY,
        }
    }

    /// Share an existing metrics tracker (e.g. with an [`ArtifactStore`]).
    ///
    /// [`ArtifactStore`]: crate::application::store::ArtifactStore
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Set the fraction of calls that trigger an opportunistic sweep.
    ///
    /// Zero disables opportunistic sweeping entirely; pair it with
    /// [`sweep_expired`](Self::sweep_expired) driven from a timer, or an
    /// [`ExpirySweeper`](crate::application::sweeper::ExpirySweeper).
    ///
    /// # Panics
    /// Panics if `probability` is not within `0.0..=1.0`.
    pub fn with_sweep_probability(mut self, probability: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&probability),
            "sweep probability must be within 0.0..=1.0"
        );
        self.sweep_probability = probability;
        self
    }

    /// Observe one request for `key` and decide whether to admit it.
    ///
    /// If no record exists for the key, or its window has elapsed, a fresh
    /// window is opened counting this request as the first. Within a live
    /// window, requests are admitted until the policy limit is reached;
    /// beyond that the call fails with [`RateLimited`].
    ///
    /// # Errors
    /// Returns [`RateLimited`] when the window is exhausted. This is the
    /// designed backpressure path, not a fault.
    ///
    /// # Panics
    /// Panics if `key` is empty; an empty identity is a programmer error.
    pub fn check_and_consume(
        &self,
        key: &str,
        policy: &RateLimitPolicy,
    ) -> Result<(), RateLimited> {
        assert!(!key.is_empty(), "rate limit key must not be empty");

        // Opportunistic maintenance on a small fraction of calls; admission
        // correctness never depends on it having run.
        if self.sweep_probability > 0.0 && rand::random::<f64>() < self.sweep_probability {
            self.sweep_expired();
        }

        let now = self.clock.now();
        let window = policy.window();
        let admission = self.storage.with_entry_mut(
            key.to_owned(),
            || WindowState::open(now, window),
            |state| state.observe(now, policy),
        );

        match admission {
            Admission::Admitted => {
                self.metrics.record_admitted();
                Ok(())
            }
            Admission::Rejected { retry_after } => {
                let retry_after_secs = retry_after_secs(retry_after);
                self.metrics.record_rejected();
                debug!(key, retry_after_secs, "rate limit window exhausted");
                Err(RateLimited { retry_after_secs })
            }
        }
    }

    /// Remove every record whose window has elapsed.
    ///
    /// Returns the number of records removed. Safe to call from a timer or
    /// ad hoc; an admitted key whose record was swept simply opens a fresh
    /// window on its next request.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.storage.len();
        self.storage.retain(|_, state| !state.is_expired(now));
        let swept = before.saturating_sub(self.storage.len());

        if swept > 0 {
            self.metrics.record_swept(swept as u64);
            debug!(swept, "removed expired rate limit records");
        }
        swept
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.storage.len()
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
