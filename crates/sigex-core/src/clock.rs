//! Process-wide local-to-exchange clock offset.
//!
//! The exchange rejects signed requests whose timestamp falls outside its
//! receive window. `ClockState` tracks how far the local clock is from the
//! exchange clock so that outgoing timestamps can be corrected.
//!
//! # Offset Convention
//! `offset_ms = exchange_time - local_time`
//! - Positive: exchange clock is ahead of local
//! - Negative: exchange clock is behind local
//!
//! Writes go through a single critical section; reads are lock-free and may
//! observe a slightly stale value.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Trait for obtaining current time, enabling testability.
pub trait Clock: Send + Sync {
    /// Returns current time in milliseconds since Unix epoch.
    fn now_ms(&self) -> u64;
}

/// System clock implementation using real time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        // A clock before 1970 is reported as the epoch itself.
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Local-to-exchange clock offset shared by the skew guard and the gateway.
pub struct ClockState {
    /// Offset: exchange_time - local_time.
    offset_ms: AtomicI64,
    /// Local time of the last successful resync. Also serializes writers.
    last_sync_ms: Mutex<Option<u64>>,
    clock: Arc<dyn Clock>,
}

impl ClockState {
    /// Drift above this is logged as a warning on resync.
    const DRIFT_WARN_THRESHOLD_MS: i64 = 2000;

    /// Creates a state with zero offset.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            offset_ms: AtomicI64::new(0),
            last_sync_ms: Mutex::new(None),
            clock,
        }
    }

    #[must_use]
    pub fn with_system_clock() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    /// Current local time.
    #[must_use]
    pub fn local_now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Current offset (may be stale under concurrent updates).
    #[must_use]
    pub fn offset_ms(&self) -> i64 {
        self.offset_ms.load(Ordering::Acquire)
    }

    /// Local time corrected by the offset; used to timestamp requests.
    #[must_use]
    pub fn exchange_now_ms(&self) -> u64 {
        let local = self.clock.now_ms();
        let offset = self.offset_ms();
        if offset >= 0 {
            local.saturating_add(offset as u64)
        } else {
            local.saturating_sub(offset.unsigned_abs())
        }
    }

    /// Local time of the last successful resync, if any.
    #[must_use]
    pub fn last_sync_ms(&self) -> Option<u64> {
        *self.last_sync_ms.lock()
    }

    /// True when no resync happened within `min_interval_ms`.
    #[must_use]
    pub fn is_stale(&self, min_interval_ms: u64) -> bool {
        match self.last_sync_ms() {
            None => true,
            Some(last) => self.clock.now_ms().saturating_sub(last) >= min_interval_ms,
        }
    }

    /// Re-derive the offset from an exchange time reading.
    ///
    /// Returns the new offset.
    pub fn apply_exchange_time(&self, exchange_time_ms: u64) -> i64 {
        let mut last_sync = self.last_sync_ms.lock();
        let local = self.clock.now_ms();
        let offset = if exchange_time_ms >= local {
            (exchange_time_ms - local) as i64
        } else {
            -((local - exchange_time_ms) as i64)
        };

        if offset.abs() > Self::DRIFT_WARN_THRESHOLD_MS {
            tracing::warn!(offset_ms = offset, "significant time drift detected with exchange");
        }

        self.offset_ms.store(offset, Ordering::Release);
        *last_sync = Some(local);
        offset
    }

    /// Shift the offset by `delta_ms`. Returns the new offset.
    pub fn nudge(&self, delta_ms: i64) -> i64 {
        let _guard = self.last_sync_ms.lock();
        let offset = self.offset_ms.load(Ordering::Acquire).saturating_add(delta_ms);
        self.offset_ms.store(offset, Ordering::Release);
        offset
    }
}

impl std::fmt::Debug for ClockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClockState")
            .field("offset_ms", &self.offset_ms())
            .field("last_sync_ms", &self.last_sync_ms())
            .finish()
    }
}

impl Default for ClockState {
    fn default() -> Self {
        Self::with_system_clock()
    }
}
