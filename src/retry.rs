//! Retry policy for NCBI requests
//!
//! Transient failures (timeouts, connection resets, 5xx and 429 responses) are retried
//! with exponential backoff. Everything else is returned to the caller on the first
//! attempt.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, warn};

/// Errors that know whether repeating the failed operation can succeed
pub trait RetryableError {
    /// Whether the operation should be attempted again
    fn is_retryable(&self) -> bool;

    /// Short human-readable reason, used in log events
    fn retry_reason(&self) -> &str;
}

/// Backoff configuration for retried requests
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Number of retries after the first attempt
    pub max_retries: usize,
    /// Delay before the first retry; doubles on every further retry
    pub initial_delay: Duration,
    /// Upper bound for a single delay
    pub max_delay: Duration,
    /// Randomize each delay to avoid synchronized retries
    pub use_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(16),
            use_jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// A policy that never retries
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.use_jitter = false;
        self
    }

    /// The sequence of delays slept between attempts
    pub fn delays(&self) -> Vec<Duration> {
        // ExponentialBackoff yields base^n * factor; base 2 with factor initial/2
        // gives initial, 2*initial, 4*initial, ...
        let factor = (self.initial_delay.as_millis() as u64 / 2).max(1);
        let use_jitter = self.use_jitter;

        ExponentialBackoff::from_millis(2)
            .factor(factor)
            .max_delay(self.max_delay)
            .map(|delay| if use_jitter { jitter(delay) } else { delay })
            .take(self.max_retries)
            .collect()
    }
}

/// Run `operation`, retrying transient failures according to `config`
///
/// `label` names the operation in log events.
pub async fn with_retry<T, E, F, Fut>(operation: F, config: &RetryConfig, label: &str) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryableError + Display,
{
    RetryIf::spawn(config.delays(), operation, |err: &E| {
        if err.is_retryable() {
            warn!(
                operation = label,
                reason = err.retry_reason(),
                error = %err,
                "Transient failure, retrying"
            );
            true
        } else {
            debug!(operation = label, reason = err.retry_reason(), "Not retrying");
            false
        }
    })
    .await
}
