//! Retry with exponential backoff for transient fetch failures

use std::time::Duration;

use crate::cancel::CancellationToken;

/// Errors that know whether another attempt could succeed
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Retry budget and backoff base
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Exponential backoff: base * 2^(attempt-1) (2s, 4s, 8s, ... by default)
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// Retry a fallible operation with exponential backoff.
///
/// Non-retryable errors return immediately. A poisoned `token` stops further
/// attempts and returns the last error.
pub fn retry_with_backoff<T, E>(
    label: &str,
    policy: &RetryPolicy,
    token: &CancellationToken,
    mut attempt_fn: impl FnMut() -> Result<T, E>,
) -> Result<T, E>
where
    E: Retryable + std::fmt::Display,
{
    let mut attempt = 0u32;
    loop {
        match attempt_fn() {
            Ok(v) => return Ok(v),
            Err(e) if attempt < policy.max_retries && e.is_retryable() && !token.is_poisoned() => {
                attempt += 1;
                log::debug!(
                    "{label}: attempt {attempt}/{} failed: {e}, retrying...",
                    policy.max_retries
                );
                std::thread::sleep(policy.backoff_duration(attempt));
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Flaky(bool);

    impl Retryable for Flaky {
        fn is_retryable(&self) -> bool {
            self.0
        }
    }

    impl std::fmt::Display for Flaky {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "flaky(retryable={})", self.0)
        }
    }

    fn fast(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(1),
        }
    }

    #[test]
    fn backoff_exponential() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_duration(1), Duration::from_secs(2));
        assert_eq!(policy.backoff_duration(2), Duration::from_secs(4));
        assert_eq!(policy.backoff_duration(3), Duration::from_secs(8));
    }

    #[test]
    fn succeeds_after_transient_failures() {
        let mut calls = 0;
        let result = retry_with_backoff("t", &fast(3), &CancellationToken::new(), || {
            calls += 1;
            if calls < 3 { Err(Flaky(true)) } else { Ok(calls) }
        });
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn gives_up_after_budget() {
        let mut calls = 0;
        let result: Result<(), _> =
            retry_with_backoff("t", &fast(2), &CancellationToken::new(), || {
                calls += 1;
                Err(Flaky(true))
            });
        assert!(result.is_err());
        assert_eq!(calls, 3);
    }

    #[test]
    fn non_retryable_returns_immediately() {
        let mut calls = 0;
        let result: Result<(), _> =
            retry_with_backoff("t", &fast(5), &CancellationToken::new(), || {
                calls += 1;
                Err(Flaky(false))
            });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn poisoned_token_stops_retrying() {
        let token = CancellationToken::new();
        token.poison();
        let mut calls = 0;
        let result: Result<(), _> = retry_with_backoff("t", &fast(5), &token, || {
            calls += 1;
            Err(Flaky(true))
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
