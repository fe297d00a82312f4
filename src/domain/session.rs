//! Artifact sessions and their identifiers.
//!
//! A session stages one generated binary (a rendered PDF, typically) between
//! the request that produced it and the single later request that downloads
//! it. Sessions are addressed by an unguessable UUID and expire after a
//! fixed TTL.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Unguessable one-time token addressing a staged artifact.
///
/// Wraps a random UUIDv4. The textual form is what gets embedded in the
/// download URL handed back to the client.
///
/// # Example
/// ```
/// use costguard::SessionId;
///
/// let id = SessionId::generate();
/// let parsed: SessionId = id.to_string().parse().unwrap();
/// assert_eq!(parsed, id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A staged binary artifact awaiting its one retrieval.
#[derive(Debug, Clone)]
pub struct ArtifactSession {
    payload: Vec<u8>,
    file_name: String,
    created_at: Instant,
    expires_at: Instant,
}

impl ArtifactSession {
    /// Create a session expiring `ttl` after `now`.
    pub fn new(payload: Vec<u8>, file_name: String, now: Instant, ttl: Duration) -> Self {
        Self {
            payload,
            file_name,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// The staged bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Suggested file name for the download response.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// When the session was created.
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// When the session expires.
    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Whether the session has outlived its TTL.
    pub fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }

    /// Age of the session at `now`.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    /// Consume the session, yielding the payload and file name.
    pub fn into_parts(self) -> (Vec<u8>, String) {
        (self.payload, self.file_name)
    }
}
