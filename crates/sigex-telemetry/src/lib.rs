//! Prometheus metrics and structured logging for sigex.
//!
//! - Prometheus counters for signals, submissions, rejections and clock syncs
//! - Structured logging with tracing (JSON in production)
//! - Text exposition for the `/metrics` endpoint

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, DEFAULT_LOG_FILTER};
pub use metrics::Metrics;
