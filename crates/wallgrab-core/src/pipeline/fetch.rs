//! Bounded-time network retrieval with streaming size enforcement.
//!
//! A [`Fetcher`] performs exactly one attempt; [`fetch_with_retry`] layers the
//! retry policy on top so that alternative fetchers (and test doubles) get the
//! same retry semantics for free.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::config::DownloadConfig;
use crate::error::FetchError;
use crate::types::FetchResult;

use super::retry;

/// Initial buffer reservation when the server does not announce a length.
const DEFAULT_BUFFER_CAPACITY: usize = 256 * 1024;

/// One network retrieval attempt.
///
/// Implementations must be safe to share across workers.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url` once. Must be time-bounded by the implementation.
    async fn fetch_once(&self, url: &str) -> Result<FetchResult, FetchError>;
}

/// How many times and how patiently to retry transient failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Base backoff delay in milliseconds
    pub base_delay_ms: u64,
}

impl RetryPolicy {
    pub fn from_config(config: &DownloadConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay_ms: config.retry_delay_ms,
        }
    }

    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: 0,
        }
    }
}

/// Fetch `url`, retrying transient failures according to `policy`.
///
/// Once `cancel` fires no further attempt is started; an attempt already in
/// flight runs to completion within its own timeout.
pub async fn fetch_with_retry(
    fetcher: &dyn Fetcher,
    url: &str,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Result<FetchResult, FetchError> {
    let mut attempt = 0u32;
    loop {
        let error = match fetcher.fetch_once(url).await {
            Ok(result) => return Ok(result),
            Err(e) => e,
        };

        if attempt >= policy.max_retries || !retry::is_retryable(&error) {
            return Err(error);
        }

        let delay = retry::backoff_duration(attempt, policy.base_delay_ms);
        attempt += 1;
        tracing::warn!(
            "Retry {attempt}/{} for {url} after {delay:?}: {error}",
            policy.max_retries
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Stop requested, abandoning retries for {url}");
                return Err(FetchError::Cancelled);
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

/// HTTP fetcher backed by a shared `reqwest` connection pool.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_bytes: Option<u64>,
}

impl HttpFetcher {
    /// Build a fetcher with its own client from download settings.
    pub fn new(config: &DownloadConfig) -> Result<Self, FetchError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(timeout)
            .pool_max_idle_per_host(config.concurrency)
            .build()
            .map_err(|e| FetchError::network(format!("cannot build HTTP client: {e}")))?;
        Ok(Self::with_client(client, timeout, config.max_size_bytes))
    }

    /// Wrap an existing client.
    pub fn with_client(client: reqwest::Client, timeout: Duration, max_bytes: Option<u64>) -> Self {
        Self {
            client,
            timeout,
            max_bytes,
        }
    }

    async fn attempt(&self, url: reqwest::Url) -> Result<FetchResult, FetchError> {
        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let announced = response.content_length();
        if let (Some(limit), Some(len)) = (self.max_bytes, announced) {
            if len > limit {
                return Err(FetchError::SizeExceeded { limit });
            }
        }

        let capacity = announced
            .map(|len| len as usize)
            .unwrap_or(DEFAULT_BUFFER_CAPACITY)
            .min(DEFAULT_BUFFER_CAPACITY * 64);
        let mut bytes = Vec::with_capacity(capacity);
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FetchError::network(e.to_string()))?;
            if let Some(limit) = self.max_bytes {
                if (bytes.len() + chunk.len()) as u64 > limit {
                    return Err(FetchError::SizeExceeded { limit });
                }
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(FetchResult {
            bytes,
            content_type,
            elapsed: start.elapsed(),
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_once(&self, url: &str) -> Result<FetchResult, FetchError> {
        let parsed = reqwest::Url::parse(url).map_err(|_| FetchError::InvalidUrl {
            url: url.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
            });
        }

        match tokio::time::timeout(self.timeout, self.attempt(parsed)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::timeout(self.timeout.as_millis() as u64)),
        }
    }
}
