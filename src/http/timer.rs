//! Clock and sleep abstraction used between retries.

use async_trait::async_trait;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Timer: Send + Sync {
    /// Current wall-clock time in unix seconds.
    fn now(&self) -> f64;

    /// Suspends the caller for the full duration. Not cancellable.
    async fn sleep(&self, duration: Duration);
}

/// Timer backed by the system clock and the tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[async_trait]
impl Timer for TokioTimer {
    fn now(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
