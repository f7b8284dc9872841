//! Resilient Fetcher Module
//!
//! Retries transient failures with full-jitter backoff and honours
//! `Retry-After` on rate limiting.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::{sleep, timeout};
use tracing::{debug, error, warn};

use super::{
    calculate_backoff, parse_retry_after, redact_url, HttpRequest, HttpResponse, HttpTransport,
    JitterSource, ThreadRngJitter,
};
use crate::error::FetchError;

// == Retry Policy ==
/// Retry configuration, fixed for the duration of one logical call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts = `max_retries + 1`
    pub max_retries: u32,
    /// Backoff base; attempt `n` waits up to `base_delay_ms * 2^n`
    pub base_delay_ms: u64,
    /// Hard limit for each individual attempt
    pub timeout_ms: u64,
}

impl RetryPolicy {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 500,
            timeout_ms: 10_000,
        }
    }
}

/// Why an attempt did not produce a usable response.
enum Failure {
    RateLimited(HttpResponse),
    Server(HttpResponse),
    Transport(FetchError),
}

impl Failure {
    fn into_error(self, attempts: u32) -> FetchError {
        match self {
            Failure::RateLimited(response) | Failure::Server(response) => {
                FetchError::RetriesExhausted {
                    attempts,
                    response: Box::new(response),
                }
            }
            Failure::Transport(err) => err,
        }
    }
}

// == Resilient Fetcher ==
/// Wraps an [`HttpTransport`] with timeout, retry and backoff.
#[derive(Clone)]
pub struct ResilientFetcher {
    transport: Arc<dyn HttpTransport>,
    policy: RetryPolicy,
    jitter: Arc<dyn JitterSource>,
}

impl ResilientFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self {
            transport,
            policy,
            jitter: Arc::new(ThreadRngJitter),
        }
    }

    /// Replaces the random source used for backoff delays.
    pub fn with_jitter(mut self, jitter: Arc<dyn JitterSource>) -> Self {
        self.jitter = jitter;
        self
    }

    /// Performs `request` under the fetcher's own policy.
    pub async fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
        self.fetch_with_retry(request, &self.policy).await
    }

    // == Fetch With Retry ==
    /// Performs `request`, retrying transient failures.
    ///
    /// - 2xx and non-429 4xx responses are returned as soon as they arrive.
    /// - 429 waits for `Retry-After` when it parses, otherwise for a backoff.
    /// - 5xx, transport failures and per-attempt timeouts wait for a backoff.
    ///
    /// Once `policy.max_retries` retries are spent the last failure is
    /// returned as an error. Nothing is slept after the final attempt.
    pub async fn fetch_with_retry(
        &self,
        request: &HttpRequest,
        policy: &RetryPolicy,
    ) -> Result<HttpResponse, FetchError> {
        let url = redact_url(&request.url);
        let mut attempt: u32 = 0;

        loop {
            let failure = match timeout(policy.timeout(), self.transport.send(request)).await {
                Ok(Ok(response)) if response.is_success() => {
                    debug!(url = %url, status = response.status, attempt, "request succeeded");
                    return Ok(response);
                }
                Ok(Ok(response)) if response.is_rate_limited() => Failure::RateLimited(response),
                Ok(Ok(response)) if response.is_server_error() => Failure::Server(response),
                Ok(Ok(response)) => {
                    debug!(url = %url, status = response.status, "non-retryable response");
                    return Ok(response);
                }
                Ok(Err(err)) => Failure::Transport(FetchError::Transport(err)),
                Err(_) => Failure::Transport(FetchError::Timeout {
                    timeout_ms: policy.timeout_ms,
                }),
            };

            if attempt >= policy.max_retries {
                let err = failure.into_error(attempt + 1);
                error!(
                    url = %url,
                    max_retries = policy.max_retries,
                    error = %err,
                    "request failed after all retries"
                );
                return Err(err);
            }

            let delay_ms = self.delay_for(&failure, attempt, policy, &url);
            sleep(Duration::from_millis(delay_ms)).await;
            attempt += 1;
        }
    }

    fn delay_for(&self, failure: &Failure, attempt: u32, policy: &RetryPolicy, url: &str) -> u64 {
        let backoff = || calculate_backoff(attempt, policy.base_delay_ms, self.jitter.as_ref());

        match failure {
            Failure::RateLimited(response) => {
                let delay_ms =
                    parse_retry_after(response.header("retry-after")).unwrap_or_else(backoff);
                warn!(url, attempt, delay_ms, "rate limited (429), backing off");
                delay_ms
            }
            Failure::Server(response) => {
                let delay_ms = backoff();
                warn!(
                    url,
                    status = response.status,
                    attempt,
                    delay_ms,
                    "server error, retrying"
                );
                delay_ms
            }
            Failure::Transport(err) => {
                let delay_ms = backoff();
                warn!(url, error = %err, attempt, delay_ms, "request failed, retrying");
                delay_ms
            }
        }
    }
}

impl std::fmt::Debug for ResilientFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientFetcher")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
