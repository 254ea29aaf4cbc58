//! Clock skew guard for signed exchange requests.
//!
//! Keeps [`ClockState`] aligned with the exchange clock and decides when a
//! failed submission is a timestamp / receive-window rejection that earns a
//! single resync-and-retry.

use std::sync::Arc;

use tracing::{debug, info, warn};

use sigex_core::ClockState;
use sigex_telemetry::Metrics;

use crate::gateway::{ExchangeGateway, GatewayResult};

/// Offset adjustment applied after a timestamp-class rejection.
///
/// Negative: the corrected clock reads earlier than the exchange clock, as
/// a client clock running ahead is the usual cause of these rejections.
pub const TIMESTAMP_NUDGE_MS: i64 = -1000;

/// Minimum spacing between non-forced resyncs.
pub const DEFAULT_MIN_RESYNC_INTERVAL_MS: u64 = 30_000;

/// Lower-case markers of timestamp / receive-window rejections.
const TIMESTAMP_ERROR_MARKERS: &[&str] = &[
    "timestamp",
    "recv_window",
    "recvwindow",
    "recv window",
    "time window",
    "server time",
    "req_timestamp",
];

/// Proof that one retry was authorized after a timestamp-class rejection.
///
/// Not `Clone`: each permit pays for exactly one resubmission.
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub struct RetryPermit {
    /// Offset in effect for the retry.
    pub offset_ms: i64,
}

/// Maintains the local-to-exchange clock offset.
#[derive(Debug, Clone)]
pub struct ClockSkewGuard {
    state: Arc<ClockState>,
    min_resync_interval_ms: u64,
}

impl ClockSkewGuard {
    pub fn new(state: Arc<ClockState>) -> Self {
        Self {
            state,
            min_resync_interval_ms: DEFAULT_MIN_RESYNC_INTERVAL_MS,
        }
    }

    /// Shared clock state, as read by the gateway when stamping requests.
    pub fn state(&self) -> &Arc<ClockState> {
        &self.state
    }

    /// Re-derive the offset from the exchange clock.
    ///
    /// Without `force`, the call is skipped while the last sync is younger
    /// than the minimum resync interval.
    ///
    /// # Returns
    /// The new offset, or `None` if the sync was skipped.
    pub async fn sync_clock(
        &self,
        gateway: &dyn ExchangeGateway,
        force: bool,
    ) -> GatewayResult<Option<i64>> {
        if !force && !self.state.is_stale(self.min_resync_interval_ms) {
            debug!(offset_ms = self.state.offset_ms(), "Clock sync skipped, still fresh");
            Metrics::clock_sync("skipped");
            return Ok(None);
        }

        match gateway.server_time_ms().await {
            Ok(server_time) => {
                let offset = self.state.apply_exchange_time(server_time);
                debug!(offset_ms = offset, force, "Clock synced with exchange");
                Metrics::clock_sync("ok");
                Metrics::clock_offset(offset);
                Ok(Some(offset))
            }
            Err(e) => {
                Metrics::clock_sync("failed");
                Err(e)
            }
        }
    }

    /// Best-effort forced resync before a private call.
    ///
    /// Failure is logged and swallowed; the exchange's receive window may
    /// still absorb the drift. Returns whether the sync succeeded.
    pub async fn before_call(&self, gateway: &dyn ExchangeGateway) -> bool {
        match self.sync_clock(gateway, true).await {
            Ok(_) => true,
            Err(e) => {
                warn!(
                    error = %e,
                    offset_ms = self.state.offset_ms(),
                    "Clock sync failed, submitting with last known offset"
                );
                false
            }
        }
    }

    /// Whether `message` describes a timestamp / receive-window rejection.
    ///
    /// Case-insensitive substring match against a fixed marker set.
    #[must_use]
    pub fn classify_failure(message: &str) -> bool {
        let lower = message.to_lowercase();
        TIMESTAMP_ERROR_MARKERS
            .iter()
            .any(|marker| lower.contains(marker))
    }

    /// Resync, shift the offset by [`TIMESTAMP_NUDGE_MS`] and authorize one retry.
    pub async fn on_timestamp_failure(&self, gateway: &dyn ExchangeGateway) -> RetryPermit {
        if let Err(e) = self.sync_clock(gateway, true).await {
            warn!(error = %e, "Clock resync after timestamp rejection failed");
        }
        let offset_ms = self.state.nudge(TIMESTAMP_NUDGE_MS);
        info!(offset_ms, "Clock offset nudged after timestamp rejection");
        Metrics::timestamp_retry();
        Metrics::clock_offset(offset_ms);
        RetryPermit { offset_ms }
    }
}
