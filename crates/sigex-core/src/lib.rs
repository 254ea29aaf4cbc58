//! Core domain types for the sigex signal execution engine.
//!
//! This crate provides the vocabulary shared by the engine, the exchange
//! gateway and the webhook listener:
//! - `Price`, `Size`: Precision-safe numeric types
//! - `SignalName`, `TradingSignal`, `OrderIntent`: Inbound trading intent
//! - `OrderSpec`, `OrderSide`, `OrderType`: Outbound order description
//! - `Position`, `PositionSnapshot`: Exchange position views
//! - `ClockState`: Process-wide local-to-exchange clock offset

pub mod clock;
pub mod decimal;
pub mod error;
pub mod order;
pub mod position;
pub mod signal;

pub use clock::{Clock, ClockState, SystemClock};
pub use decimal::{Price, Size};
pub use error::{CoreError, Result};
pub use order::{ClientOrderId, OrderSide, OrderSpec, OrderType};
pub use position::{Position, PositionSide, PositionSnapshot};
pub use signal::{OrderIntent, QuantityRequest, SignalName, TradingSignal, FULL_CLOSE_SENTINEL};
