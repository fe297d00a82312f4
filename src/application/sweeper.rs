//! Periodic expiry sweeping.
//!
//! Both tables expire entries lazily; the sweeper bounds memory growth by
//! also clearing them on a timer. Correctness of admission and retrieval
//! never depends on the sweeper having run.

use crate::application::limiter::RateLimiter;
use crate::application::ports::Storage;
use crate::application::store::ArtifactStore;
use crate::domain::session::{ArtifactSession, SessionId};
use crate::domain::window::WindowState;
use std::time::Duration;
use tracing::debug;

#[cfg(feature = "async")]
use tokio::time::interval;

/// Error returned when sweep configuration validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepConfigError {
    /// Sweep interval must be greater than zero
    ZeroInterval,
}

impl std::fmt::Display for SweepConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SweepConfigError::ZeroInterval => write!(f, "sweep interval must be greater than 0"),
        }
    }
}

impl std::error::Error for SweepConfigError {}

/// Configuration for periodic sweeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    /// How often to sweep both tables
    pub interval: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
        }
    }
}

impl SweepConfig {
    /// Create a sweep config with the specified interval.
    ///
    /// # Errors
    /// Returns `SweepConfigError::ZeroInterval` if `interval` is zero.
    pub fn new(interval: Duration) -> Result<Self, SweepConfigError> {
        if interval.is_zero() {
            return Err(SweepConfigError::ZeroInterval);
        }
        Ok(Self { interval })
    }
}

/// Outcome of one sweep pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepReport {
    /// Expired rate limit records removed
    pub records_swept: usize,
    /// Expired artifact sessions removed
    pub sessions_swept: usize,
}

impl SweepReport {
    /// Total entries removed across both tables.
    pub fn total(&self) -> usize {
        self.records_swept + self.sessions_swept
    }
}

/// Sweeps a limiter and store pair on a fixed interval.
#[derive(Debug)]
pub struct ExpirySweeper<L, A>
where
    L: Storage<String, WindowState> + Clone,
    A: Storage<SessionId, ArtifactSession> + Clone,
{
    limiter: RateLimiter<L>,
    store: ArtifactStore<A>,
    config: SweepConfig,
}

impl<L, A> ExpirySweeper<L, A>
where
    L: Storage<String, WindowState> + Clone,
    A: Storage<SessionId, ArtifactSession> + Clone,
{
    /// Create a sweeper over a limiter and store pair.
    pub fn new(limiter: RateLimiter<L>, store: ArtifactStore<A>, config: SweepConfig) -> Self {
        Self {
            limiter,
            store,
            config,
        }
    }

    /// Sweep both tables once, synchronously.
    pub fn sweep_once(&self) -> SweepReport {
        let report = SweepReport {
            records_swept: self.limiter.sweep_expired(),
            sessions_swept: self.store.sweep_expired(),
        };

        if report.total() > 0 {
            debug!(
                records = report.records_swept,
                sessions = report.sessions_swept,
                "expiry sweep completed"
            );
        }
        report
    }

    /// Start sweeping periodically on a background task.
    ///
    /// Abort the returned handle to stop sweeping; both tables keep working
    /// (with lazy expiry only) after the sweeper stops.
    #[cfg(feature = "async")]
    pub fn start(self) -> tokio::task::JoinHandle<()>
    where
        L: Send + 'static,
        A: Send + 'static,
    {
        tokio::spawn(async move {
            let mut ticker = interval(self.config.interval);
            // The first tick fires immediately; skip it so a freshly started
            // sweeper doesn't race table construction.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                self.sweep_once();
            }
        })
    }

    /// Get the sweeper configuration.
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }
}
