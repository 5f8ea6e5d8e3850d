//! Retry policy for throttled and transient Graph responses.
//!
//! 429 responses honour `Retry-After` (seconds, capped at the maximum delay),
//! otherwise the delay grows exponentially. 502, 503 and 504 are retried with
//! exponential backoff. Every delay gets up to 25% jitter.

use std::time::Duration;

use rand::Rng;
use reqwest::StatusCode;
use tracing::{info, warn};

use crate::config::RetryConfig;

const JITTER_FACTOR: f64 = 0.25;

/// Bounded retry schedule shared by all Graph requests.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }
}

impl RetryPolicy {
    /// Maximum number of retries after the first attempt.
    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Whether a response status is worth retrying.
    #[must_use]
    pub fn is_retryable(status: StatusCode) -> bool {
        matches!(
            status,
            StatusCode::TOO_MANY_REQUESTS
                | StatusCode::BAD_GATEWAY
                | StatusCode::SERVICE_UNAVAILABLE
                | StatusCode::GATEWAY_TIMEOUT
        )
    }

    /// Parses the Retry-After header value. Only the seconds form is supported.
    #[must_use]
    pub fn parse_retry_after(header_value: &str) -> Option<u64> {
        header_value.trim().parse::<u64>().ok()
    }

    /// Calculates backoff delay with exponential growth.
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let base = self.base_delay.as_millis() as f64;
        let max = self.max_delay.as_millis() as f64;

        let delay_ms = (base * 2_f64.powi(attempt.min(31) as i32)).min(max);

        Duration::from_millis(delay_ms as u64)
    }

    /// Delay before the next attempt, before jitter.
    #[must_use]
    pub fn delay_for(&self, attempt: u32, retry_after_secs: Option<u64>) -> Duration {
        match retry_after_secs {
            Some(secs) => {
                let requested = Duration::from_secs(secs);
                if requested > self.max_delay {
                    warn!(
                        "Retry-After {} seconds exceeds max, capping at {:?}",
                        secs, self.max_delay
                    );
                }
                requested.min(self.max_delay)
            }
            None => self.backoff_delay(attempt),
        }
    }

    /// Adds jitter to a delay.
    #[must_use]
    pub fn add_jitter(delay: Duration) -> Duration {
        let delay_ms = delay.as_millis() as f64;
        let jitter = rand::thread_rng().gen_range(0.0..=delay_ms * JITTER_FACTOR);

        Duration::from_millis((delay_ms + jitter) as u64)
    }

    /// Sleeps before retry `attempt` (zero-based).
    pub async fn wait(&self, status: StatusCode, attempt: u32, retry_after_secs: Option<u64>) {
        let delay = Self::add_jitter(self.delay_for(attempt, retry_after_secs));
        info!(
            %status,
            attempt = attempt + 1,
            max_retries = self.max_retries,
            "Retrying Graph request after {:?}",
            delay
        );
        tokio::time::sleep(delay).await;
    }
}
