//! Exponential-backoff retry wrapper (`spec.md` §4.2).
//!
//! Generalized from the teacher's `error_recovery_manager.rs`: that module
//! keyed policies per *error type* and paired them with a circuit breaker.
//! The spec keys policies per *network* instead (one `default` profile
//! reused by ETH/BNB/SOL, a dedicated `BASE` profile) and names no circuit
//! breaker, so this keeps only the backoff core.

use crate::network::Network;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub struct RetryProfile {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl RetryProfile {
    pub const DEFAULT: RetryProfile = RetryProfile {
        max_retries: 3,
        initial_delay: Duration::from_millis(1000),
        max_delay: Duration::from_millis(10_000),
        multiplier: 2.0,
    };

    pub const BASE: RetryProfile = RetryProfile {
        max_retries: 5,
        initial_delay: Duration::from_millis(2500),
        max_delay: Duration::from_millis(20_000),
        multiplier: 2.5,
    };

    pub fn for_network(network: Network) -> RetryProfile {
        match network {
            Network::Base => RetryProfile::BASE,
            Network::Eth | Network::Bnb | Network::Sol => RetryProfile::DEFAULT,
        }
    }

    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let scaled = self.initial_delay.as_millis() as f64 * self.multiplier.powi(attempt as i32 - 1);
        let capped = scaled.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }
}

/// Substrings that mark a failure as transient (`spec.md` §4.2), matched
/// case-insensitively against the error's `Display` output.
const RETRYABLE_SUBSTRINGS: &[&str] = &[
    "429",
    "rate limit",
    "too many requests",
    "econnreset",
    "etimedout",
    "enotfound",
];

pub fn is_retryable(error_message: &str) -> bool {
    let lower = error_message.to_lowercase();
    RETRYABLE_SUBSTRINGS.iter().any(|needle| lower.contains(needle))
}

/// Runs `op` under the given profile, retrying while the error is
/// retryable. On the final attempt the last error is returned verbatim;
/// a non-retryable error propagates immediately without consuming a retry.
pub async fn execute_with_retry<F, Fut, T, E>(profile: RetryProfile, op_name: &str, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt: u32 = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let message = err.to_string();
                if !is_retryable(&message) || attempt >= profile.max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay = profile.delay_for_attempt(attempt);
                warn!(
                    "{op_name} failed (attempt {attempt}/{}), retrying in {}ms: {message}",
                    profile.max_retries,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_after_two_retryable_failures() {
        let attempts = AtomicU32::new(0);
        let result: Result<&str, String> = execute_with_retry(RetryProfile::DEFAULT, "test", || {
            let count = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if count < 2 {
                    Err("HTTP 429".to_string())
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausts_retries_and_surfaces_last_error() {
        let attempts = AtomicU32::new(0);
        let result: Result<&str, String> = execute_with_retry(RetryProfile::DEFAULT, "test", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async move { Err::<&str, String>("rate limit exceeded".to_string()) }
        })
        .await;

        assert_eq!(result, Err("rate limit exceeded".to_string()));
        // initial attempt + max_retries(3) retries = 4 total
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn non_retryable_error_propagates_immediately() {
        let attempts = AtomicU32::new(0);
        let result: Result<&str, String> = execute_with_retry(RetryProfile::DEFAULT, "test", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async move { Err::<&str, String>("insufficient funds".to_string()) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
