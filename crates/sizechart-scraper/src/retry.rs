//! Retry with exponential backoff for transient HTTP errors.
//!
//! Transient errors (429, network failures, 5xx responses) are retried
//! with exponential backoff. Everything else (404, malformed bodies,
//! invalid URLs) is propagated immediately — retrying would return the
//! same result.

use std::future::Future;
use std::time::Duration;

use crate::error::ExtractError;

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable errors:
/// - [`ExtractError::RateLimited`] — HTTP 429; the server asked us to back off.
/// - [`ExtractError::Http`] — network-level failure (connection reset, timeout).
/// - [`ExtractError::UnexpectedStatus`] with a 5xx status — server hiccup.
fn is_retriable(err: &ExtractError) -> bool {
    match err {
        ExtractError::RateLimited { .. } | ExtractError::Http(_) => true,
        ExtractError::UnexpectedStatus { status, .. } => *status >= 500,
        _ => false,
    }
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// On a retriable error the function sleeps for `backoff_base_secs * 2^attempt`
/// seconds and tries again, up to `max_retries` additional attempts after the
/// first try. If all retries are exhausted the last error is returned.
/// Non-retriable errors are returned immediately without sleeping.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ExtractError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ExtractError>>,
{
    let mut last_err;
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                last_err = err;
            }
        }

        // Exponential backoff: base * 2^attempt seconds, saturating so
        // extreme configs cannot overflow.
        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %last_err,
            "transient error — retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
