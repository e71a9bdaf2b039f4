use crate::config::RetryConfig;
use crate::error::FetchError;
use std::future::Future;

/// Outcome of a single HTTP attempt, as seen by the retry loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptError {
    /// The server asked us to slow down (HTTP 429).
    RateLimited {
        /// Seconds to wait, from `Retry-After`
        retry_after: u64,
    },
    /// Anything else; returned to the caller immediately.
    Fatal(FetchError),
}

impl From<FetchError> for AttemptError {
    fn from(error: FetchError) -> Self {
        Self::Fatal(error)
    }
}

/// Result of a retry operation with context
#[derive(Debug)]
pub struct RetryResult<T> {
    /// The successful result
    pub result: T,
    /// Number of retry attempts made
    pub attempts_made: u32,
    /// Total time spent waiting (in seconds)
    pub total_retry_time: u64,
}

/// Delay before retry number `retries` (0-based) of a rate limited request.
pub fn backoff_delay(config: &RetryConfig, retries: u32, retry_after: u64) -> u64 {
    let base_backoff = config
        .base_delay
        .saturating_mul(2_u64.saturating_pow(retries));
    std::cmp::min(retry_after.saturating_add(base_backoff), config.max_delay)
}

/// Execute an async operation, retrying while it is rate limited.
///
/// Only [`AttemptError::RateLimited`] is retried. Once retries are exhausted
/// (or disabled) the rate limit is reported as a [`FetchError::Network`].
///
/// # Arguments
/// * `config` - Retry configuration
/// * `operation_name` - Name of the operation for logging
/// * `operation` - Async function performing one attempt
pub async fn retry_with_backoff<T, F, Fut>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<RetryResult<T>, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AttemptError>>,
{
    let mut retries = 0;
    let mut total_retry_time = 0;

    loop {
        match operation().await {
            Ok(result) => {
                return Ok(RetryResult {
                    result,
                    attempts_made: retries,
                    total_retry_time,
                });
            }
            Err(AttemptError::RateLimited { retry_after }) => {
                if !config.enabled || retries >= config.max_retries {
                    log::warn!(
                        "Max retries ({}) exceeded for {} operation",
                        config.max_retries,
                        operation_name
                    );
                    return Err(FetchError::Network(format!(
                        "rate limited after {retries} retries (retry after {retry_after}s)"
                    )));
                }

                let delay = backoff_delay(config, retries, retry_after);
                log::info!(
                    "{} rate limited. Waiting {} seconds before retry {} of {}",
                    operation_name,
                    delay,
                    retries + 1,
                    config.max_retries
                );

                tokio::time::sleep(std::time::Duration::from_secs(delay)).await;
                retries += 1;
                total_retry_time += delay;
            }
            Err(AttemptError::Fatal(error)) => return Err(error),
        }
    }
}
