//! Exponential backoff for transient NWS failures.
//!
//! Retry decisions dispatch purely on the [`NwsApiError`] variant: transient
//! failures are retried with `base_delay * 2^attempt` sleeps, everything else
//! (geographic errors, generic API errors, malformed responses) is returned
//! to the caller immediately.

use crate::nws::error::NwsApiError;
use log::{error, warn};
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles each attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Backoff delay after a failed attempt (0-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Run `operation` until it succeeds, fails terminally, or exhausts the
/// policy's attempts. On exhaustion the last transient failure is converted
/// into [`NwsApiError::ServiceUnavailable`] carrying the attempt count.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, mut operation: F) -> Result<T, NwsApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, NwsApiError>>,
{
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 0..max_attempts {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() => {
                if attempt + 1 < max_attempts {
                    let delay = policy.delay_for_attempt(attempt);
                    warn!(
                        "NWS API unavailable, retrying in {:?} (attempt {}/{}): {e}",
                        delay,
                        attempt + 1,
                        max_attempts
                    );
                    tokio::time::sleep(delay).await;
                } else {
                    error!("NWS API unavailable after {max_attempts} attempts: {e}");
                    let url = match e {
                        NwsApiError::Transient { url, .. } => url,
                        _ => String::new(),
                    };
                    return Err(NwsApiError::ServiceUnavailable {
                        url,
                        attempts: max_attempts,
                    });
                }
            }
            Err(e) => {
                error!("NWS API error (no retry): {e}");
                return Err(e);
            }
        }
    }

    unreachable!("retry loop returns on the final attempt")
}
