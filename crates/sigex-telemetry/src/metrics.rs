//! Prometheus metrics for the execution engine.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A failure means duplicate metric
//! names, which is a programming error caught on first use.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_counter, register_int_gauge,
    CounterVec, Encoder, HistogramVec, IntCounter, IntGauge, TextEncoder,
};

use crate::error::{TelemetryError, TelemetryResult};

/// Signals accepted by the translator.
/// Labels: signal (ENTER_LONG/ENTER_SHORT/EXIT_LONG/EXIT_SHORT)
pub static SIGNALS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "sigex_signals_total",
        "Total trading signals received",
        &["signal"]
    )
    .unwrap()
});

/// Submission attempts, including retries.
pub static ORDERS_SUBMITTED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "sigex_orders_submitted_total",
        "Total order submission attempts",
        &["order_type"]
    )
    .unwrap()
});

/// Terminal failures by error kind.
pub static ORDERS_REJECTED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "sigex_orders_rejected_total",
        "Total terminal execution failures",
        &["kind"]
    )
    .unwrap()
});

/// Submission round-trip latency in milliseconds.
pub static SUBMIT_LATENCY_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "sigex_submit_latency_ms",
        "Order submission round-trip latency in milliseconds",
        &["outcome"],
        vec![10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0]
    )
    .unwrap()
});

/// Clock sync outcomes.
/// Labels: outcome (ok/failed/skipped)
pub static CLOCK_SYNC_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "sigex_clock_sync_total",
        "Total exchange clock sync attempts",
        &["outcome"]
    )
    .unwrap()
});

/// Current local-to-exchange offset in milliseconds.
pub static CLOCK_OFFSET_MS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "sigex_clock_offset_ms",
        "Exchange time minus local time in milliseconds"
    )
    .unwrap()
});

/// Resync-and-retry cycles after timestamp rejections.
pub static TIMESTAMP_RETRY_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "sigex_timestamp_retry_total",
        "Total retries after timestamp-class rejections"
    )
    .unwrap()
});

/// Protective levels dropped by the risk guard.
pub static RISK_FIELD_DROPPED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "sigex_risk_field_dropped_total",
        "Total take-profit / stop-loss levels dropped",
        &["field"]
    )
    .unwrap()
});

/// Metrics facade.
pub struct Metrics;

impl Metrics {
    pub fn signal_received(signal: &str) {
        SIGNALS_TOTAL.with_label_values(&[signal]).inc();
    }

    pub fn order_submitted(order_type: &str) {
        ORDERS_SUBMITTED_TOTAL.with_label_values(&[order_type]).inc();
    }

    pub fn order_rejected(kind: &str) {
        ORDERS_REJECTED_TOTAL.with_label_values(&[kind]).inc();
    }

    /// Record one submission round trip. `outcome` is "ok" or "error".
    pub fn submit_latency(outcome: &str, latency_ms: f64) {
        SUBMIT_LATENCY_MS
            .with_label_values(&[outcome])
            .observe(latency_ms);
    }

    pub fn clock_sync(outcome: &str) {
        CLOCK_SYNC_TOTAL.with_label_values(&[outcome]).inc();
    }

    pub fn clock_offset(offset_ms: i64) {
        CLOCK_OFFSET_MS.set(offset_ms);
    }

    pub fn timestamp_retry() {
        TIMESTAMP_RETRY_TOTAL.inc();
    }

    pub fn risk_field_dropped(field: &str) {
        RISK_FIELD_DROPPED_TOTAL.with_label_values(&[field]).inc();
    }

    /// Encode the default registry in the Prometheus text format.
    pub fn render() -> TelemetryResult<String> {
        let encoder = TextEncoder::new();
        let mut buf = Vec::new();
        encoder
            .encode(&prometheus::gather(), &mut buf)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }

    /// Content type of [`Metrics::render`] output.
    pub fn content_type() -> &'static str {
        prometheus::TEXT_FORMAT
    }
}
