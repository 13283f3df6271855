//! Error kinds surfaced by the request executor.

use chrono::{DateTime, Local};
use reqwest::StatusCode;

/// Terminal outcome of a logical request that did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The service reported an exhausted rate limit and the retry budget
    /// (or the remaining wait) did not allow another attempt.
    #[error("Rate limit exceeded. Resets at {}", format_reset_time(*.reset_time))]
    RateLimitExceeded {
        /// Unix timestamp at which the quota is replenished.
        reset_time: i64,
    },

    /// Any non-2xx response that is not a rate limit. Never retried.
    #[error("HTTP {status}: {body}")]
    Http { status: StatusCode, body: String },

    /// Connection, timeout, DNS or body transfer failure after all retries.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The response arrived but its body did not have the expected shape.
    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Maximum retries exceeded")]
    RetriesExhausted,
}

impl ApiError {
    /// Returns true for the non-rate-limit HTTP status failure.
    pub fn is_http(&self) -> bool {
        matches!(self, ApiError::Http { .. })
    }
}

/// Renders a rate-limit reset timestamp as local date-time.
pub fn format_reset_time(reset_time: i64) -> String {
    match DateTime::from_timestamp(reset_time, 0) {
        Some(utc) => utc
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => reset_time.to_string(),
    }
}
