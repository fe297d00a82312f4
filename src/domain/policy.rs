//! Rate limit policies for admission control.
//!
//! A policy is static configuration: how many requests a key may make within
//! a fixed window. The catalogue in [`catalog`] mirrors the endpoint
//! categories the limiter protects.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Error returned when policy validation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyError {
    /// Window duration must be greater than zero
    ZeroWindow,
    /// Max requests per window must be greater than zero
    ZeroMaxRequests,
}

impl std::fmt::Display for PolicyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyError::ZeroWindow => write!(f, "window duration must be greater than 0"),
            PolicyError::ZeroMaxRequests => {
                write!(f, "max requests per window must be greater than 0")
            }
        }
    }
}

impl std::error::Error for PolicyError {}

/// Fixed-window rate limit configuration.
///
/// Policies are immutable values, selected per endpoint category and never
/// mutated at runtime.
///
/// # Example
/// ```
/// use costguard::RateLimitPolicy;
/// use std::time::Duration;
///
/// let policy = RateLimitPolicy::new(Duration::from_secs(60), 10).unwrap();
/// assert_eq!(policy.max_requests(), 10);
///
/// // Or use the catalogue of known endpoint categories:
/// let speak = costguard::catalog::SPEAK;
/// assert_eq!(speak.window(), Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitPolicy {
    window: Duration,
    max_requests: u32,
}

impl RateLimitPolicy {
    /// Create a validated policy.
    ///
    /// # Errors
    /// Returns `PolicyError` if `window` is zero or `max_requests` is zero.
    pub fn new(window: Duration, max_requests: u32) -> Result<Self, PolicyError> {
        if window.is_zero() {
            return Err(PolicyError::ZeroWindow);
        }
        if max_requests == 0 {
            return Err(PolicyError::ZeroMaxRequests);
        }
        Ok(Self {
            window,
            max_requests,
        })
    }

    /// Create a per-minute policy. Known-valid, so no runtime validation.
    pub const fn per_minute(max_requests: u32) -> Self {
        Self {
            window: Duration::from_secs(60),
            max_requests,
        }
    }

    /// Length of the counting window.
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Maximum admitted requests per window.
    pub const fn max_requests(&self) -> u32 {
        self.max_requests
    }
}

/// Build the limiter key for a principal on an endpoint category.
///
/// Keys take the form `"<category>:<principal>"`, e.g. `"speak:user-42"`,
/// so the same principal is limited independently per category.
///
/// # Panics
/// Panics if `category` or `principal` is empty; an empty identity is a
/// programmer error, not a runtime condition.
pub fn principal_key(category: &str, principal: &str) -> String {
    assert!(!category.is_empty(), "rate limit category must not be empty");
    assert!(
        !principal.is_empty(),
        "rate limit principal must not be empty"
    );
    format!("{category}:{principal}")
}

/// Policies for the endpoint categories the limiter protects.
///
/// Values are configuration, not logic; they follow the cost profile of the
/// upstream APIs (speech synthesis is the most expensive, chat the cheapest).
pub mod catalog {
    use super::RateLimitPolicy;

    /// Speech synthesis - expensive, strict limit.
    pub const SPEAK: RateLimitPolicy = RateLimitPolicy::per_minute(10);

    /// Audio transcription - moderate.
    pub const TRANSCRIBE: RateLimitPolicy = RateLimitPolicy::per_minute(20);

    /// Chat completion - moderate.
    pub const CHAT: RateLimitPolicy = RateLimitPolicy::per_minute(30);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_policy() {
        let policy = RateLimitPolicy::new(Duration::from_secs(60), 10).unwrap();
        assert_eq!(policy.window(), Duration::from_secs(60));
        assert_eq!(policy.max_requests(), 10);
    }

    #[test]
    fn test_zero_window_rejected() {
        let result = RateLimitPolicy::new(Duration::ZERO, 10);
        assert_eq!(result, Err(PolicyError::ZeroWindow));
    }

    #[test]
    fn test_zero_max_requests_rejected() {
        let result = RateLimitPolicy::new(Duration::from_secs(60), 0);
        assert_eq!(result, Err(PolicyError::ZeroMaxRequests));
    }

    #[test]
    fn test_catalog_values() {
        assert_eq!(catalog::SPEAK.max_requests(), 10);
        assert_eq!(catalog::TRANSCRIBE.max_requests(), 20);
        assert_eq!(catalog::CHAT.max_requests(), 30);

        for policy in [catalog::SPEAK, catalog::TRANSCRIBE, catalog::CHAT] {
            assert_eq!(policy.window(), Duration::from_secs(60));
        }
    }

    #[test]
    fn test_principal_key_format() {
        assert_eq!(principal_key("speak", "user-42"), "speak:user-42");
    }

    #[test]
    #[should_panic(expected = "category must not be empty")]
    fn test_empty_category_panics() {
        principal_key("", "user-42");
    }

    #[test]
    #[should_panic(expected = "principal must not be empty")]
    fn test_empty_principal_panics() {
        principal_key("speak", "");
    }

    #[test]
    fn test_policy_serde_round_trip() {
        let policy = catalog::TRANSCRIBE;
        let json = serde_json::to_string(&policy).unwrap();
        let back: RateLimitPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, policy);
    }
}
