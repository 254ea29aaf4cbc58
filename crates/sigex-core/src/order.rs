//! Order-related types and identifiers.
//!
//! Provides order side, order type, client order ID and the fully
//! resolved `OrderSpec` handed to the exchange gateway.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::signal::OrderIntent;
use crate::{Price, Size};

/// Order side: buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "Buy",
            Self::Sell => "Sell",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    /// Market order, filled at the prevailing price.
    Market,
    /// Limit order at an explicit price.
    Limit,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Market => "Market",
            Self::Limit => "Limit",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client order ID attached to every submission.
///
/// A retried submission carries a fresh ID; the exchange treats the two
/// attempts as distinct requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientOrderId(String);

impl ClientOrderId {
    /// Create a new unique client order ID.
    ///
    /// Format: `sigex_{timestamp_ms}_{uuid_short}` (at most 36 characters).
    pub fn new() -> Self {
        let ts = chrono::Utc::now().timestamp_millis();
        let uuid_short = &Uuid::new_v4().simple().to_string()[..8];
        Self(format!("sigex_{ts}_{uuid_short}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClientOrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ClientOrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Fully resolved order, ready for the exchange gateway.
///
/// Invariant: `order_type == Limit` iff `price` is `Some`. The only
/// constructor derives the type from the price, so the invariant cannot be
/// broken from outside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSpec {
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: Size,
    pub price: Option<Price>,
    pub reduce_only: bool,
    pub take_profit: Option<Price>,
    pub stop_loss: Option<Price>,
}

impl OrderSpec {
    /// Build an order from an intent. A limit price makes it a limit order.
    #[must_use]
    pub fn new(intent: &OrderIntent, quantity: Size, limit_price: Option<Price>) -> Self {
        let order_type = if limit_price.is_some() {
            OrderType::Limit
        } else {
            OrderType::Market
        };
        Self {
            symbol: intent.symbol.clone(),
            side: intent.side,
            order_type,
            quantity,
            price: limit_price,
            reduce_only: intent.reduce_only,
            take_profit: None,
            stop_loss: None,
        }
    }

    /// Attach take-profit / stop-loss levels.
    #[must_use]
    pub fn with_protection(mut self, take_profit: Option<Price>, stop_loss: Option<Price>) -> Self {
        self.take_profit = take_profit;
        self.stop_loss = stop_loss;
        self
    }
}
