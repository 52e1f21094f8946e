//! Retry Logic and Error Resilience
//!
//! Retries transient TestRail failures with exponential backoff and jitter.
//!
//! # Policy
//!
//! - **Retryable**: no response received, HTTP 429, HTTP 500-599
//! - **Terminal**: every other status, body-shape failures, local failures
//!
//! The retry budget counts retries, not attempts: a budget of 3 allows up to
//! four requests in total.
//!
//! # Example
//!
//! ```ignore
//! use testrail_mcp::testrail::retry::{RetryConfig, retry_with_backoff};
//!
//! let config = RetryConfig::default()
//!     .max_retries(3)
//!     .base_delay(Duration::from_millis(100));
//!
//! let body = retry_with_backoff(&config, "get_case/1", || async {
//!     send_once().await
//! }).await?;
//! ```

use super::error::TestRailError;
use std::time::Duration;
use tokio::time::sleep;

/// Retry configuration
///
/// # Fields
///
/// * `max_retries` - Retries after the first attempt (default: 3)
/// * `base_delay` - Delay before the first retry (default: 100ms)
/// * `max_delay` - Upper bound for any single delay (default: 5s)
/// * `jitter` - Random delay variation factor (default: 0.1 = 10%)
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retries after the initial attempt
    pub max_retries: usize,

    /// Base delay before first retry
    pub base_delay: Duration,

    /// Maximum delay between retries
    pub max_delay: Duration,

    /// Jitter factor (0.0 to 1.0)
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            jitter: 0.1,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the retry budget
    pub fn max_retries(mut self, retries: usize) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the base delay between retries
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the maximum delay between retries
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the jitter factor, clamped to `0.0..=1.0`
    pub fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    /// Calculate delay for a given retry (0-based)
    ///
    /// Uses exponential backoff: delay = base_delay * 2^retry,
    /// then applies jitter and caps at max_delay.
    pub fn calculate_delay(&self, retry: usize) -> Duration {
        let factor = 2_u32.saturating_pow(retry.min(31) as u32);
        let exponential_delay = self.base_delay.saturating_mul(factor);

        let jitter_range = exponential_delay.mul_f64(self.jitter);
        let jitter_offset = (rand::random::<f64>() - 0.5) * 2.0 * jitter_range.as_secs_f64();
        let jittered_delay =
            exponential_delay.saturating_add(Duration::from_secs_f64(jitter_offset.abs()));

        jittered_delay.min(self.max_delay)
    }
}

/// Retry an operation with exponential backoff
///
/// Each failed attempt is classified through [`TestRailError::is_retryable`].
/// Terminal errors return immediately; retryable ones are retried until the
/// budget is spent, after which the last error is returned.
///
/// `target` identifies the request in retry diagnostics (endpoint path only).
pub async fn retry_with_backoff<F, T, Fut>(
    config: &RetryConfig,
    target: &str,
    mut operation: F,
) -> Result<T, TestRailError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, TestRailError>>,
{
    let mut retry = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if retry > 0 {
                    tracing::info!(target_path = target, retries = retry, "TestRail request succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if retry < config.max_retries && e.is_retryable() => {
                retry += 1;
                let delay = config.calculate_delay(retry - 1);
                tracing::warn!(
                    target_path = target,
                    retry_count = retry,
                    status = ?e.status,
                    kind = %e.kind,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying TestRail request"
                );
                sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Check if an HTTP status code should be retried
///
/// Retryable: 429 Too Many Requests and every 5xx.
pub fn should_retry_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testrail::error::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn fast() -> RetryConfig {
        RetryConfig::default()
            .base_delay(Duration::from_millis(1))
            .jitter(0.0)
    }

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.base_delay, Duration::from_millis(100));
        assert_eq!(config.max_delay, Duration::from_secs(5));
        assert_eq!(config.jitter, 0.1);
    }

    #[test]
    fn test_calculate_delay_exponential() {
        let config = RetryConfig::new()
            .base_delay(Duration::from_millis(100))
            .max_delay(Duration::from_secs(10))
            .jitter(0.0);

        assert_eq!(config.calculate_delay(0), Duration::from_millis(100));
        assert_eq!(config.calculate_delay(1), Duration::from_millis(200));
        assert_eq!(config.calculate_delay(2), Duration::from_millis(400));
        assert_eq!(config.calculate_delay(10), Duration::from_secs(10));
        assert_eq!(config.calculate_delay(200), Duration::from_secs(10));
    }

    #[test]
    fn test_calculate_delay_with_jitter_stays_in_band() {
        let config = RetryConfig::new()
            .base_delay(Duration::from_millis(100))
            .jitter(0.2);

        for _ in 0..20 {
            let delay = config.calculate_delay(1);
            assert!(delay >= Duration::from_millis(200));
            assert!(delay <= Duration::from_millis(240));
        }
    }

    #[test]
    fn test_jitter_clamping() {
        assert_eq!(RetryConfig::new().jitter(1.5).jitter, 1.0);
        assert_eq!(RetryConfig::new().jitter(-0.5).jitter, 0.0);
    }

    #[test]
    fn test_should_retry_status() {
        assert!(should_retry_status(429));
        assert!(should_retry_status(500));
        assert!(should_retry_status(501));
        assert!(should_retry_status(503));
        assert!(should_retry_status(599));

        assert!(!should_retry_status(400));
        assert!(!should_retry_status(401));
        assert!(!should_retry_status(404));
        assert!(!should_retry_status(408));
        assert!(!should_retry_status(600));
    }

    #[tokio::test]
    async fn test_three_503_then_success() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);

        let result = retry_with_backoff(&fast(), "get_case/1", move || {
            let counter = Arc::clone(&counter);
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 3 {
                    Err(TestRailError::from_status(503))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_budget_exhausted_returns_last_error() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);

        let result: Result<(), _> = retry_with_backoff(&fast(), "get_projects", move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(TestRailError::from_status(429))
            }
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RateLimited);
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_no_retry_on_terminal_status() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);

        let result: Result<(), _> = retry_with_backoff(&fast(), "get_case/9", move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(TestRailError::from_status(404))
            }
        })
        .await;

        assert_eq!(result.unwrap_err().kind, ErrorKind::NotFound);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_network_errors_are_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);

        let result = retry_with_backoff(&fast().max_retries(1), "get_projects", move || {
            let counter = Arc::clone(&counter);
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(TestRailError::network("connection reset"))
                } else {
                    Ok("ok")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_budget_means_single_attempt() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);

        let result: Result<(), _> =
            retry_with_backoff(&fast().max_retries(0), "get_projects", move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(TestRailError::from_status(500))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
