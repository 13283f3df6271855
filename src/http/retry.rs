//! Retry policy for API requests: outcome classification and the
//! wait-or-give-up decision for each kind of failure.
//!
//! The policy never sleeps itself. It tells the executor how long to wait,
//! which keeps the decision logic independent of the scheduling model.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::HeaderMap;

use super::response::ApiResponse;

/// Default maximum number of retries for a single logical request.
pub const MAX_RETRIES: u32 = 3;

/// Default base delay for exponential backoff on network failures.
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Extra time added on top of the advertised rate-limit reset.
pub const RATE_LIMIT_BUFFER: Duration = Duration::from_secs(1);

/// Upper bound for a single rate-limit wait.
pub const MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(3600);

pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";

/// Classification of a single request attempt.
#[derive(Debug)]
pub enum Outcome {
    Success(ApiResponse),
    /// 403 carrying a rate-limit-remaining header.
    RateLimited { reset_time: i64 },
    /// Any other non-2xx status.
    HttpFailure(ApiResponse),
    /// The request never produced a complete response.
    Transient(reqwest::Error),
}

/// What the executor should do after a retryable failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    GiveUp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub rate_limit_buffer: Duration,
    pub max_rate_limit_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            retry_delay: RETRY_DELAY,
            rate_limit_buffer: RATE_LIMIT_BUFFER,
            max_rate_limit_wait: MAX_RATE_LIMIT_WAIT,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            max_retries,
            retry_delay,
            ..Self::default()
        }
    }

    /// Sorts one attempt into success, rate limit, HTTP failure or transient failure.
    ///
    /// A 403 is treated as a rate limit only when the remaining-count header is
    /// present. Secondary rate limits that omit it surface as HTTP failures.
    pub fn classify(&self, attempt: Result<ApiResponse, reqwest::Error>) -> Outcome {
        let response = match attempt {
            Ok(response) => response,
            Err(e) => return Outcome::Transient(e),
        };

        if response.status == StatusCode::FORBIDDEN
            && response.headers.contains_key(RATE_LIMIT_REMAINING_HEADER)
        {
            // A missing or malformed reset reads as "already reset", which
            // yields a non-positive wait and an immediate failure.
            let reset_time = header_value(&response.headers, RATE_LIMIT_RESET_HEADER)
                .and_then(|v| v.trim().parse::<i64>().ok())
                .unwrap_or(0);
            return Outcome::RateLimited { reset_time };
        }

        if response.status.is_success() {
            Outcome::Success(response)
        } else {
            Outcome::HttpFailure(response)
        }
    }

    /// Backoff before retry number `retries + 1`: `retry_delay * 2^retries`.
    pub fn backoff(&self, retries: u32) -> Duration {
        let factor = 2u32.saturating_pow(retries);
        self.retry_delay.saturating_mul(factor)
    }

    /// Time to wait for a reset at `reset_time` seen at `now` (unix seconds),
    /// or `None` when the reset is not in the future.
    pub fn rate_limit_wait(&self, reset_time: i64, now: f64) -> Option<Duration> {
        let wait = reset_time as f64 - now;
        if wait > 0.0 {
            let padded = wait + self.rate_limit_buffer.as_secs_f64();
            Some(Duration::from_secs_f64(
                padded.min(self.max_rate_limit_wait.as_secs_f64()),
            ))
        } else {
            None
        }
    }

    pub fn on_rate_limit(&self, retries: u32, reset_time: i64, now: f64) -> RetryDecision {
        match self.rate_limit_wait(reset_time, now) {
            Some(wait) if retries < self.max_retries => RetryDecision::RetryAfter(wait),
            _ => RetryDecision::GiveUp,
        }
    }

    pub fn on_network_error(&self, retries: u32) -> RetryDecision {
        if retries < self.max_retries {
            RetryDecision::RetryAfter(self.backoff(retries))
        } else {
            RetryDecision::GiveUp
        }
    }
}

pub(crate) fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
