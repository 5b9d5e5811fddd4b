//! Retry utilities for upstream HTTP requests with exponential backoff.
//!
//! Retries are strictly per-request: a request slot gets a bounded number
//! of attempts with growing delays, and once they are exhausted the
//! failure is handed back to the caller, which drops the page/record or
//! aborts the run according to the error policy. The job as a whole is
//! never re-run.

use std::time::Duration;

use tokio::time::sleep;

use crate::config::NetworkConfig;

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not including the initial attempt)
    pub max_attempts: u32,

    /// Initial delay between retries
    pub initial_delay: Duration,

    /// Maximum delay between retries (for exponential backoff)
    pub max_delay: Duration,

    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,

    /// Whether to add jitter to prevent thundering herd
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Derive the per-request retry settings from the network configuration.
    pub fn from_network(net: &NetworkConfig) -> Self {
        Self {
            max_attempts: net.retry_attempts,
            initial_delay: net.retry_delay,
            ..Self::default()
        }
    }
}

/// Policy for determining if an operation should be retried
pub trait RetryPolicy {
    /// Returns true if the operation should be retried for this error
    fn should_retry(&self, error: &anyhow::Error, attempt: u32) -> bool;
}

/// Retry policy for HTTP GET requests against the upstream.
///
/// Transient transport problems and throttling/5xx statuses are worth a
/// second attempt; client errors (404 and friends) are not.
pub struct HttpRetryPolicy;

impl RetryPolicy for HttpRetryPolicy {
    fn should_retry(&self, error: &anyhow::Error, _attempt: u32) -> bool {
        let error_str = error.to_string().to_lowercase();

        error_str.contains("timeout")
            || error_str.contains("timed out")
            || error_str.contains("connection refused")
            || error_str.contains("connection reset")
            || error_str.contains("temporary failure")
            || error_str.contains("network unreachable")
            || error_str.contains("host unreachable")
            || error_str.contains("too many requests")
            || error_str.contains("service unavailable")
            || error_str.contains("internal server error")
            || error_str.contains("bad gateway")
            || error_str.contains("gateway timeout")
    }
}

/// Retry executor that handles the retry logic
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    /// Create a new retry executor with the given configuration
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Execute an async operation with retry logic.
    ///
    /// The final error is returned once attempts are exhausted or the
    /// policy declines a retry.
    pub async fn execute<F, Fut, T, P>(&self, operation: F, policy: &P) -> anyhow::Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = anyhow::Result<T>>,
        P: RetryPolicy + ?Sized,
    {
        let mut delay = self.config.initial_delay;

        for attempt in 0..=self.config.max_attempts {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(error) => {
                    if attempt >= self.config.max_attempts || !policy.should_retry(&error, attempt)
                    {
                        return Err(error);
                    }

                    let actual_delay = if self.config.jitter {
                        add_jitter(delay)
                    } else {
                        delay
                    };
                    sleep(actual_delay).await;

                    delay = std::cmp::min(
                        Duration::from_millis(
                            (delay.as_millis() as f64 * self.config.backoff_multiplier) as u64,
                        ),
                        self.config.max_delay,
                    );
                }
            }
        }

        unreachable!("retry loop returns before exhausting the range")
    }
}

/// Add random jitter to prevent thundering herd problems
fn add_jitter(delay: Duration) -> Duration {
    use rand::Rng;

    let jitter_range = delay.as_millis() as f64 * 0.1; // 10% jitter
    let mut rng = rand::rng();
    let jitter: f64 = rng.random_range(-jitter_range..=jitter_range);

    let jittered_ms = (delay.as_millis() as f64 + jitter).max(0.0) as u64;
    Duration::from_millis(jittered_ms)
}
