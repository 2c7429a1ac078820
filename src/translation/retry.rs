/*!
 * Bounded retry with exponential backoff.
 *
 * Transient provider failures (throttling, server errors, dropped
 * connections, empty answers) are retried; anything else is returned to the
 * caller at once.
 */

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use log::{error, warn};

use crate::app_config::TranslationCommonConfig;
use crate::errors::ProviderError;

/// How often and how patiently a call is retried
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one, at least 1
    pub max_attempts: u32,
    /// Wait before the second attempt; doubled for every further one
    pub initial_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
        }
    }

    pub fn from_config(common: &TranslationCommonConfig) -> Self {
        Self::new(common.retry_count, common.retry_backoff())
    }

    /// Wait after the failed attempt `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(10))
    }
}

/// Source of waiting between attempts and between chunks
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Run `action` until it succeeds, fails fatally, or the attempts run out
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    label: &str,
    mut action: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match action().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() => {
                error!("{}: non-retryable failure: {}", label, e);
                return Err(e);
            }
            Err(e) => {
                if attempt + 1 >= max_attempts {
                    error!("{}: giving up after {} attempts: {}", label, max_attempts, e);
                    return Err(e);
                }

                let delay = policy.delay_for(attempt);
                warn!(
                    "{}: attempt {}/{} failed ({}), retrying in {:?}",
                    label,
                    attempt + 1,
                    max_attempts,
                    e,
                    delay
                );
                sleeper.sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
