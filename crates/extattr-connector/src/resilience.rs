//! Retry with exponential backoff.
//!
//! Directory calls that fail with a transient error are retried with a
//! growing delay. An error carrying the server's own retry hint overrides
//! the computed delay.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use crate::error::ConnectorError;

/// Errors a [`RetryExecutor`] can classify.
pub trait Retryable: fmt::Display {
    /// Whether repeating the same call may succeed.
    fn is_transient(&self) -> bool;

    /// Delay requested by the server before the next attempt.
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

impl Retryable for ConnectorError {
    fn is_transient(&self) -> bool {
        ConnectorError::is_transient(self)
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            ConnectorError::RateLimited { retry_after_secs } if *retry_after_secs > 0 => {
                Some(Duration::from_secs(*retry_after_secs))
            }
            _ => None,
        }
    }
}

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first call.
    pub max_retries: u32,
    /// Initial delay before first retry.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f64,
    /// Whether to add jitter to delays.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// A configuration that never retries.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Backoff delay for a given attempt (0-indexed), capped at `max_delay`.
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let base_ms = self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(exponent);
        let capped_ms = base_ms.min(self.max_delay.as_millis() as f64);

        let final_ms = if self.jitter {
            // Up to 25% extra, never past the cap.
            let factor = 1.0 + rand::thread_rng().gen_range(0.0..0.25);
            (capped_ms * factor).min(self.max_delay.as_millis() as f64)
        } else {
            capped_ms
        };

        Duration::from_millis(final_ms as u64)
    }

    /// Delay to wait after `error` on the given attempt.
    ///
    /// Honors the server's retry hint when there is one.
    #[must_use]
    pub fn delay_for<E: Retryable>(&self, error: &E, attempt: u32) -> Duration {
        error
            .retry_after()
            .unwrap_or_else(|| self.backoff_delay(attempt))
    }
}

/// Retry executor with exponential backoff.
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    /// Create a new retry executor with the given configuration.
    #[must_use]
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Create a new retry executor with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(RetryConfig::default())
    }

    /// The configuration in use.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Execute an operation, retrying transient failures.
    ///
    /// The last error is returned once the budget is spent or the error is
    /// permanent.
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !e.is_transient() || attempt >= self.config.max_retries {
                        return Err(e);
                    }

                    let delay = self.config.delay_for(&e, attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying after transient error"
                    );

                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
