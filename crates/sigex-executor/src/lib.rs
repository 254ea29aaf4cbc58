//! Signal-to-order execution engine.
//!
//! Turns a named trading signal into exactly one exchange order, resolving
//! close quantities from the live position and tolerating a drifting local
//! clock with a single resync-and-retry.
//!
//! # Key Components
//!
//! - [`Executor`]: Orchestrates one signal end to end
//! - [`ExchangeGateway`]: Exchange contract (position, submission, server time)
//! - [`ClockSkewGuard`]: Offset maintenance and timestamp-failure classification
//! - [`PositionResolver`]: Close quantity from the open position
//! - [`risk_guard::validate`]: Drops TP/SL levels on the wrong side of entry
//! - [`translator::translate`]: Fixed signal name → side / reduce-only table
//!
//! # Submission
//!
//! 1. Presync (forced, failure swallowed)
//! 2. Submit
//! 3. Timestamp-class failure -> resync, nudge offset -1000 ms, submit once more
//! 4. Any other failure, or a second failure -> returned verbatim

pub mod clock_guard;
pub mod error;
pub mod executor;
pub mod gateway;
pub mod order_type;
pub mod position_resolver;
pub mod risk_guard;
pub mod translator;

// Error types
pub use error::{ExecutorError, ExecutorResult};

// Gateway contract
pub use gateway::{
    BoxFuture, DynGateway, ExchangeGateway, ExchangeResponse, GatewayError, GatewayResult,
    MockGateway,
};

// Clock handling
pub use clock_guard::{ClockSkewGuard, RetryPermit, TIMESTAMP_NUDGE_MS};

// Pipeline stages
pub use order_type::{select_type, TypeSelection};
pub use position_resolver::{quantity_request, PositionResolver, ResolvedClose};
pub use risk_guard::{ProtectionField, RiskWarning, ValidatedProtection};
pub use translator::{intent_for, translate};

// Orchestrator
pub use executor::{ExecutionReport, Executor, PreparedOrder, MAX_SUBMIT_ATTEMPTS};
