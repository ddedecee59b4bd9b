//! Retry strategy for the read side of the registry client.
//!
//! Only connect and read timeouts are transient. Everything else, including
//! 4xx/5xx statuses and malformed bodies, fails immediately; the fail-open
//! handling for those lives in the fetch path, not here.

use reqwest_retry::{Retryable, RetryableStrategy};

/// Retry connect/read timeouts, nothing else.
pub struct TimeoutRetryStrategy;

impl RetryableStrategy for TimeoutRetryStrategy {
    fn handle(
        &self,
        result: &Result<reqwest::Response, reqwest_middleware::Error>,
    ) -> Option<Retryable> {
        match result {
            Ok(_) => None,
            Err(reqwest_middleware::Error::Reqwest(err))
                if err.is_timeout() || err.is_connect() =>
            {
                Some(Retryable::Transient)
            }
            Err(_) => Some(Retryable::Fatal),
        }
    }
}
