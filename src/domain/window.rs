//! Fixed-window counting state.
//!
//! A [`WindowState`] is the record the limiter keeps per key: how many
//! requests have been observed in the current window and when that window
//! resets. The admit/reject transition lives here so it can be tested
//! without any storage or clock machinery.

use crate::domain::policy::RateLimitPolicy;
use std::time::{Duration, Instant};

/// Outcome of observing one request against a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The request is within the limit and may proceed.
    Admitted,
    /// The window is exhausted; the caller should retry after the given delay.
    Rejected {
        /// Time remaining until the window resets.
        retry_after: Duration,
    },
}

impl Admission {
    /// Check if this outcome is an admission.
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

/// Per-key counting record for one fixed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    count: u32,
    reset_at: Instant,
}

impl WindowState {
    /// Open an empty window starting at `now`.
    ///
    /// The count starts at zero; the first [`observe`](Self::observe) call
    /// brings it to one. This keeps creation and observation separable so a
    /// storage layer can create-then-observe under one entry lock without
    /// double counting.
    pub fn open(now: Instant, window: Duration) -> Self {
        Self {
            count: 0,
            reset_at: now + window,
        }
    }

    /// Observe one request and decide whether to admit it.
    ///
    /// If the window has elapsed (`now >= reset_at`) the record is replaced
    /// with a fresh window counting this request as the first. Within a live
    /// window, requests are admitted until `max_requests` is reached; beyond
    /// that the request is rejected with the time left until reset.
    pub fn observe(&mut self, now: Instant, policy: &RateLimitPolicy) -> Admission {
        if now >= self.reset_at {
            self.count = 1;
            self.reset_at = now + policy.window();
            return Admission::Admitted;
        }

        if self.count < policy.max_requests() {
            self.count += 1;
            return Admission::Admitted;
        }

        Admission::Rejected {
            retry_after: self.reset_at - now,
        }
    }

    /// Requests observed in the current window.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Instant at which the current window resets.
    pub fn reset_at(&self) -> Instant {
        self.reset_at
    }

    /// Whether the window has elapsed. Expired records are sweep candidates.
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.reset_at
    }
}

/// Round a delay up to whole seconds, suitable for a `Retry-After` header.
///
/// Always at least 1 for any non-zero delay, so a rejected caller never sees
/// a zero retry hint.
pub fn retry_after_secs(retry_after: Duration) -> u64 {
    (retry_after.as_millis().div_ceil(1000)).max(1) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn per_minute(max: u32) -> RateLimitPolicy {
        RateLimitPolicy::new(Duration::from_secs(60), max).unwrap()
    }

    #[test]
    fn test_admits_up_to_limit() {
        let policy = per_minute(3);
        let now = Instant::now();
        let mut state = WindowState::open(now, policy.window());

        assert_eq!(state.observe(now, &policy), Admission::Admitted);
        assert_eq!(state.observe(now, &policy), Admission::Admitted);
        assert_eq!(state.observe(now, &policy), Admission::Admitted);
        assert_eq!(state.count(), 3);

        let rejected = state.observe(now, &policy);
        assert!(!rejected.is_admitted());
        // A rejection does not consume a slot
        assert_eq!(state.count(), 3);
    }

    #[test]
    fn test_rejection_carries_time_to_reset() {
        let policy = per_minute(1);
        let now = Instant::now();
        let mut state = WindowState::open(now, policy.window());

        assert!(state.observe(now, &policy).is_admitted());

        let later = now + Duration::from_secs(20);
        match state.observe(later, &policy) {
            Admission::Rejected { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(40));
            }
            Admission::Admitted => panic!("should have been rejected"),
        }
    }

    #[test]
    fn test_window_elapse_resets_count() {
        let policy = per_minute(2);
        let now = Instant::now();
        let mut state = WindowState::open(now, policy.window());

        assert!(state.observe(now, &policy).is_admitted());
        assert!(state.observe(now, &policy).is_admitted());
        assert!(!state.observe(now, &policy).is_admitted());

        // Exactly at reset_at the window is considered elapsed
        let at_reset = now + Duration::from_secs(60);
        assert!(state.observe(at_reset, &policy).is_admitted());
        assert_eq!(state.count(), 1);
        assert_eq!(state.reset_at(), at_reset + Duration::from_secs(60));
    }

    #[test]
    fn test_is_expired() {
        let now = Instant::now();
        let state = WindowState::open(now, Duration::from_secs(60));

        assert!(!state.is_expired(now));
        assert!(!state.is_expired(now + Duration::from_secs(59)));
        assert!(state.is_expired(now + Duration::from_secs(60)));
    }

    #[test]
    fn test_retry_after_rounds_up() {
        assert_eq!(retry_after_secs(Duration::from_secs(60)), 60);
        assert_eq!(retry_after_secs(Duration::from_millis(59_001)), 60);
        assert_eq!(retry_after_secs(Duration::from_millis(500)), 1);
        // Never hint zero seconds
        assert_eq!(retry_after_secs(Duration::ZERO), 1);
    }
}
