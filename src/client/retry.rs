//! Retry policy for outbound Redmine calls.
//!
//! The policy is a plain value: a retry budget plus an exponential backoff
//! schedule. Which outcomes are worth retrying is decided by a predicate
//! passed to [`RetryPolicy::run`], so the loop can be exercised without a
//! network.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::error::TransportFailure;
use super::transport::{RemoteRequest, RemoteResponse};
use crate::core::config::RedmineConfig;

/// Exponential backoff retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,

    /// Unit of the backoff schedule. Retry `n` waits `base_delay * 2^n`.
    pub base_delay: Duration,

    /// Also retry requests with side effects (POST/PUT/DELETE).
    pub retry_writes: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_secs(1),
            retry_writes: false,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(0)
    }

    pub fn from_config(config: &RedmineConfig) -> Self {
        Self::new(config.max_retries).with_retry_writes(config.retry_writes)
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_retry_writes(mut self, retry_writes: bool) -> Self {
        self.retry_writes = retry_writes;
        self
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.min(16)))
    }

    /// The policy to apply to `request`: writes are only retried when
    /// `retry_writes` is set.
    pub fn for_request(&self, request: &RemoteRequest) -> Self {
        if request.is_safe() || self.retry_writes {
            *self
        } else {
            Self {
                max_retries: 0,
                ..*self
            }
        }
    }

    /// Run `operation` until it yields a non-retryable outcome or the retry
    /// budget is spent, sleeping between attempts.
    pub async fn run<T, F, Fut, P>(&self, mut operation: F, retryable: P) -> T
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = T>,
        P: Fn(&T) -> bool,
    {
        let mut attempt = 0;
        loop {
            let outcome = operation().await;
            if attempt >= self.max_retries || !retryable(&outcome) {
                return outcome;
            }

            attempt += 1;
            let delay = self.delay_for(attempt);
            warn!(
                "Transient failure, retrying in {}ms (attempt {}/{})",
                delay.as_millis(),
                attempt,
                self.max_retries
            );
            tokio::time::sleep(delay).await;
        }
    }
}

/// Default retry predicate: no response received, or a 5xx status.
pub fn is_transient(outcome: &Result<RemoteResponse, TransportFailure>) -> bool {
    match outcome {
        Ok(response) => response.is_server_error(),
        Err(failure) => failure.is_network(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn status(code: u16) -> Result<RemoteResponse, TransportFailure> {
        Ok(RemoteResponse {
            status: code,
            body: String::new(),
        })
    }

    fn instant(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries).with_base_delay(Duration::ZERO)
    }

    #[test]
    fn test_backoff_doubles_per_attempt() {
        let policy = RetryPolicy::new(3);
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(3), Duration::from_secs(8));
    }

    #[test]
    fn test_transient_predicate() {
        assert!(is_transient(&status(500)));
        assert!(is_transient(&status(503)));
        assert!(is_transient(&Err(TransportFailure::Timeout)));
        assert!(is_transient(&Err(TransportFailure::Connection("reset".into()))));
        assert!(!is_transient(&status(200)));
        assert!(!is_transient(&status(404)));
        assert!(!is_transient(&status(422)));
        assert!(!is_transient(&Err(TransportFailure::Setup("bad".into()))));
    }

    #[test]
    fn test_writes_are_not_retried_by_default() {
        let policy = RetryPolicy::new(3);
        let post = RemoteRequest::post("/issues.json", serde_json::json!({}));
        assert_eq!(policy.for_request(&post).max_retries, 0);
        assert_eq!(policy.for_request(&RemoteRequest::get("/issues.json")).max_retries, 3);

        let policy = policy.with_retry_writes(true);
        assert_eq!(policy.for_request(&post).max_retries, 3);
    }

    #[tokio::test]
    async fn test_exhausts_budget_on_persistent_failure() {
        let calls = AtomicU32::new(0);
        let outcome = instant(3)
            .run(
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { status(503) }
                },
                is_transient,
            )
            .await;

        assert_eq!(outcome.unwrap().status, 503);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_stops_after_first_success() {
        let calls = AtomicU32::new(0);
        let outcome = instant(3)
            .run(
                || {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    async move { if n == 0 { status(503) } else { status(200) } }
                },
                is_transient,
            )
            .await;

        assert_eq!(outcome.unwrap().status, 200);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_client_errors_fail_immediately() {
        let calls = AtomicU32::new(0);
        let outcome = tokio_test::block_on(instant(3).run(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { status(404) }
            },
            is_transient,
        ));

        assert_eq!(outcome.unwrap().status, 404);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
