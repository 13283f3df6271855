//! Resilient HTTP layer: request executor, retry policy and error kinds.

mod client;
mod error;
mod response;
mod retry;
mod timer;

pub use client::{RequestExecutor, RequestOptions};
pub use error::{ApiError, format_reset_time};
pub use response::ApiResponse;
pub use retry::{MAX_RETRIES, RETRY_DELAY, RetryPolicy};
pub use timer::{Timer, TokioTimer};

#[cfg(test)]
pub use timer::MockTimer;
