//! Retry classification and backoff for transient fetch failures.

use crate::error::FetchError;
use std::time::Duration;

/// Determine whether a fetch error is worth retrying.
///
/// Retryable: connection failures, timeouts, rate limits (429), server errors (5xx).
/// Permanent: other 4xx statuses, malformed URLs, oversized bodies, cancellation.
pub fn is_retryable(error: &FetchError) -> bool {
    match error {
        FetchError::Network { .. } => true,
        FetchError::Http { status } => *status == 429 || (500..=599).contains(status),
        FetchError::InvalidUrl { .. } | FetchError::SizeExceeded { .. } | FetchError::Cancelled => {
            false
        }
    }
}

/// Calculate exponential backoff duration for a given attempt.
///
/// Uses `base_delay * 2^attempt` with a cap at 30 seconds.
pub fn backoff_duration(attempt: u32, base_delay_ms: u64) -> Duration {
    let delay = base_delay_ms.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(delay.min(30_000))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_retryable() {
        assert!(is_retryable(&FetchError::timeout(30_000)));
    }

    #[test]
    fn test_connection_error_is_retryable() {
        assert!(is_retryable(&FetchError::network("connection reset by peer")));
    }

    #[test]
    fn test_rate_limit_is_retryable() {
        assert!(is_retryable(&FetchError::Http { status: 429 }));
    }

    #[test]
    fn test_server_error_is_retryable() {
        assert!(is_retryable(&FetchError::Http { status: 503 }));
        assert!(is_retryable(&FetchError::Http { status: 500 }));
    }

    #[test]
    fn test_client_errors_are_permanent() {
        assert!(!is_retryable(&FetchError::Http { status: 404 }));
        assert!(!is_retryable(&FetchError::Http { status: 403 }));
        assert!(!is_retryable(&FetchError::Http { status: 400 }));
    }

    #[test]
    fn test_size_exceeded_is_permanent() {
        assert!(!is_retryable(&FetchError::SizeExceeded { limit: 1024 }));
        assert!(!is_retryable(&FetchError::Cancelled));
    }

    #[test]
    fn test_backoff_exponential() {
        assert_eq!(backoff_duration(0, 1000), Duration::from_millis(1000));
        assert_eq!(backoff_duration(1, 1000), Duration::from_millis(2000));
        assert_eq!(backoff_duration(2, 1000), Duration::from_millis(4000));
    }

    #[test]
    fn test_backoff_capped_at_30s() {
        assert_eq!(backoff_duration(10, 1000), Duration::from_millis(30_000));
    }
}
