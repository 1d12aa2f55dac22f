//! Bounded-time invocation with retry on timeout
//!
//! Each attempt is raced against a timer. Only timeouts are retried, with an
//! exponentially growing pause between attempts; any other failure is handed
//! back to the caller untouched.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use chrono::{DateTime, Utc};
use log::{debug, error, warn};

use crate::core::GenerationResponse;
use crate::error::{Result, ServiceError};

/// Guard policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardConfig {
    /// Wall-clock budget for a single attempt
    pub attempt_timeout: Duration,

    /// Retries after a timed-out attempt (0 means a single attempt)
    pub max_retries: u32,

    /// Pause before the first retry; doubled for each later retry
    pub backoff_base: Duration,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            attempt_timeout: Duration::from_secs(25),
            max_retries: 1,
            backoff_base: Duration::from_secs(1),
        }
    }
}

impl fmt::Display for GuardConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GuardConfig {{ attempt_timeout: {:?}, max_retries: {}, backoff_base: {:?} }}",
            self.attempt_timeout, self.max_retries, self.backoff_base
        )
    }
}

/// How an attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    Timeout,
    Failed,
}

/// One execution of the external call under one timeout
#[derive(Debug, Clone)]
pub struct InvocationAttempt {
    /// Zero-based attempt index
    pub ordinal: u32,

    /// When the attempt started
    pub started_at: DateTime<Utc>,

    /// How it ended
    pub outcome: AttemptOutcome,
}

/// Runs a generation call under the guard policy
#[derive(Debug, Clone, Default)]
pub struct InvocationGuard {
    config: GuardConfig,
}

impl InvocationGuard {
    /// Create a new guard with the specified policy
    pub fn new(config: GuardConfig) -> Self {
        Self { config }
    }

    /// Get the current policy
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Pauses between attempts: `base, 2*base, 4*base, ...`
    fn backoff_schedule(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.config.backoff_base,
            initial_interval: self.config.backoff_base,
            multiplier: 2.0,
            randomization_factor: 0.0,
            max_interval: Duration::from_secs(60 * 60),
            max_elapsed_time: None,
            ..ExponentialBackoff::default()
        }
    }

    /// Run `call` until it succeeds, fails with a non-timeout error, or the
    /// retry budget is spent.
    ///
    /// A timed-out attempt's future is dropped, which cancels the underlying
    /// request rather than leaving it running in the background.
    pub async fn run<F, Fut>(&self, mut call: F) -> Result<GenerationResponse>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<GenerationResponse>>,
    {
        let mut schedule = self.backoff_schedule();
        let total_attempts = self.config.max_retries + 1;
        let mut attempts: Vec<InvocationAttempt> = Vec::with_capacity(total_attempts as usize);

        loop {
            let ordinal = attempts.len() as u32;
            let started_at = Utc::now();
            debug!("Attempt {} of {}", ordinal + 1, total_attempts);

            let result = match tokio::time::timeout(self.config.attempt_timeout, call()).await {
                Ok(result) => result,
                Err(_) => Err(ServiceError::timeout(format!(
                    "Request timed out after {:?}",
                    self.config.attempt_timeout
                ))),
            };

            let outcome = match &result {
                Ok(_) => AttemptOutcome::Success,
                Err(err) if err.is_timeout() => AttemptOutcome::Timeout,
                Err(_) => AttemptOutcome::Failed,
            };
            attempts.push(InvocationAttempt {
                ordinal,
                started_at,
                outcome,
            });

            match result {
                Ok(response) if response.text.is_none() => {
                    error!("Attempt {} returned no generated content", ordinal + 1);
                    return Err(ServiceError::invalid_response(
                        "Response did not contain any generated text",
                    ));
                }
                Ok(response) => return Ok(response),
                Err(err) if err.is_timeout() && ordinal < self.config.max_retries => {
                    let pause = schedule.next_backoff().unwrap_or(self.config.backoff_base);
                    warn!(
                        "Attempt {} of {} timed out, retrying in {:?}",
                        ordinal + 1,
                        total_attempts,
                        pause
                    );
                    tokio::time::sleep(pause).await;
                }
                Err(err) if err.is_timeout() => {
                    error!("All {} attempts timed out", attempts.len());
                    return Err(err.with_context_value("attempts", attempts.len()));
                }
                Err(err) => {
                    error!("Attempt {} failed: {}", ordinal + 1, err);
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_successful_operation() {
        let guard = InvocationGuard::default();
        let result = guard
            .run(|| async { Ok(GenerationResponse::from_text("test", "{}")) })
            .await;
        assert_eq!(result.unwrap().text(), Some("{}"));
    }

    #[tokio::test]
    async fn test_missing_text_is_invalid_response() {
        let attempt_count = Arc::new(AtomicUsize::new(0));
        let guard = InvocationGuard::default();
        let counter = Arc::clone(&attempt_count);

        let result = guard
            .run(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok(GenerationResponse::default()) }
            })
            .await;

        assert!(matches!(result, Err(ServiceError::InvalidResponse(_))));
        assert_eq!(attempt_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_schedule_doubles() {
        let guard = InvocationGuard::new(GuardConfig {
            backoff_base: Duration::from_millis(100),
            ..GuardConfig::default()
        });
        let mut schedule = guard.backoff_schedule();

        assert_eq!(schedule.next_backoff(), Some(Duration::from_millis(100)));
        assert_eq!(schedule.next_backoff(), Some(Duration::from_millis(200)));
        assert_eq!(schedule.next_backoff(), Some(Duration::from_millis(400)));
    }
}
