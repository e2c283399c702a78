//! Retry logic.
//!
//! # Responsibilities
//! - Run an operation up to a fixed number of attempts
//! - Sleep a fixed delay between attempts
//! - Log every failed attempt with its number and cause
//!
//! # Design Decisions
//! - Fixed interval: no exponential growth, no jitter
//! - Every error the operation returns is retried the same way; callers
//!   decide what counts as an error (a 5xx response is not one)
//! - No sleep after the last attempt

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::config::RetryConfig;

/// Outcome of a retry loop that never succeeded.
#[derive(Debug)]
pub struct RetryExhausted<E> {
    /// Number of attempts made.
    pub attempts: u32,
    /// Error returned by the final attempt.
    pub last_error: E,
}

/// Fixed-interval retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// Create a policy; at least one attempt is always made.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_millis(config.delay_ms))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `op` until it succeeds or the attempts are used up.
    ///
    /// `op` receives the 1-based attempt number.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, RetryExhausted<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if attempt >= self.max_attempts {
                        tracing::warn!(
                            attempt,
                            max_attempts = self.max_attempts,
                            error = %error,
                            "attempt failed, giving up"
                        );
                        return Err(RetryExhausted {
                            attempts: attempt,
                            last_error: error,
                        });
                    }

                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = self.delay.as_millis() as u64,
                        error = %error,
                        "attempt failed, retrying"
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
