//! Metrics collection for a single repository.

mod collector;
mod record;

pub use collector::MetricsCollector;
pub use record::{BasicMetrics, ForkDetail, MetricsRecord, TrafficMetrics};
