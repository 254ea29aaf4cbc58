//! Inbound trading signal and the intent derived from it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::{OrderSide, Size};

/// Quantity value that legacy senders use to mean "close the whole position".
///
/// Only honoured on closing signals; on opening signals it is an ordinary
/// quantity.
pub const FULL_CLOSE_SENTINEL: &str = "999999";

/// Canonical signal names accepted from the outside world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalName {
    EnterLong,
    EnterShort,
    ExitLong,
    ExitShort,
}

impl SignalName {
    pub const ALL: [SignalName; 4] = [
        Self::EnterLong,
        Self::EnterShort,
        Self::ExitLong,
        Self::ExitShort,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EnterLong => "ENTER_LONG",
            Self::EnterShort => "ENTER_SHORT",
            Self::ExitLong => "EXIT_LONG",
            Self::ExitShort => "EXIT_SHORT",
        }
    }
}

impl fmt::Display for SignalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalName {
    type Err = CoreError;

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| CoreError::UnsupportedSignal(s.to_string()))
    }
}

/// A trading signal as received, before any interpretation.
///
/// All numeric fields stay textual here; parsing happens in the engine so
/// that every validation failure is reported through one error type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingSignal {
    pub symbol: String,
    /// Raw signal name (e.g. "ENTER_LONG").
    pub signal: String,
    pub quantity: Option<String>,
    pub price: Option<String>,
    pub take_profit: Option<String>,
    pub stop_loss: Option<String>,
}

impl TradingSignal {
    pub fn new(symbol: impl Into<String>, signal: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            signal: signal.into(),
            quantity: None,
            price: None,
            take_profit: None,
            stop_loss: None,
        }
    }

    #[must_use]
    pub fn with_quantity(mut self, qty: impl Into<String>) -> Self {
        self.quantity = Some(qty.into());
        self
    }

    #[must_use]
    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }

    #[must_use]
    pub fn with_take_profit(mut self, tp: impl Into<String>) -> Self {
        self.take_profit = Some(tp.into());
        self
    }

    #[must_use]
    pub fn with_stop_loss(mut self, sl: impl Into<String>) -> Self {
        self.stop_loss = Some(sl.into());
        self
    }
}

/// Side and reduce-only flag for one symbol, derived from the signal name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderIntent {
    pub symbol: String,
    pub side: OrderSide,
    pub reduce_only: bool,
}

/// How the order quantity is to be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityRequest {
    /// Caller supplied a usable quantity.
    Explicit(Size),
    /// Close whatever is currently open on the symbol.
    ClosePosition,
}
