//! Bybit V5 wire types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use sigex_core::{ClientOrderId, OrderSpec};
use sigex_executor::{GatewayError, GatewayResult};

/// Body of `POST /v5/order/create`.
///
/// Numeric fields are decimal strings. Field order is the serialization
/// order and therefore part of the signed payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreateRequest {
    pub category: String,
    pub symbol: String,
    pub side: String,
    pub order_type: String,
    pub qty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    pub reduce_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<String>,
    pub order_link_id: String,
}

impl OrderCreateRequest {
    pub fn from_spec(category: &str, order: &OrderSpec, link_id: &ClientOrderId) -> Self {
        Self {
            category: category.to_string(),
            symbol: order.symbol.clone(),
            side: order.side.as_str().to_string(),
            order_type: order.order_type.as_str().to_string(),
            qty: order.quantity.to_string(),
            price: order.price.map(|p| p.to_string()),
            reduce_only: order.reduce_only,
            take_profit: order.take_profit.map(|p| p.to_string()),
            stop_loss: order.stop_loss.map(|p| p.to_string()),
            order_link_id: link_id.as_str().to_string(),
        }
    }
}

/// Envelope of query endpoints.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(rename = "retCode")]
    pub ret_code: i64,
    #[serde(rename = "retMsg", default)]
    pub ret_msg: String,
    pub result: Option<T>,
    /// Server time in milliseconds, present on every response.
    #[serde(default)]
    pub time: Option<u64>,
}

impl<T> ApiEnvelope<T> {
    /// Result payload, or `Api` for a non-zero return code.
    pub fn into_result(self) -> GatewayResult<T> {
        if self.ret_code != 0 {
            return Err(GatewayError::Api {
                code: self.ret_code,
                message: self.ret_msg,
            });
        }
        self.result
            .ok_or_else(|| GatewayError::Decode("missing result".to_string()))
    }
}

/// `result` of `GET /v5/market/time`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerTime {
    pub time_second: String,
    #[serde(default)]
    pub time_nano: Option<String>,
}

impl ServerTime {
    /// Milliseconds since epoch, from the nanosecond field when present.
    pub fn as_millis(&self) -> GatewayResult<u64> {
        if let Some(nanos) = self.time_nano.as_deref().filter(|n| !n.is_empty()) {
            let nanos: u128 = nanos
                .parse()
                .map_err(|_| GatewayError::Decode(format!("Invalid timeNano: {nanos}")))?;
            return u64::try_from(nanos / 1_000_000)
                .map_err(|_| GatewayError::Decode(format!("timeNano out of range: {nanos}")));
        }
        let secs: u64 = self
            .time_second
            .parse()
            .map_err(|_| GatewayError::Decode(format!("Invalid timeSecond: {}", self.time_second)))?;
        Ok(secs.saturating_mul(1000))
    }
}

/// `result` of `GET /v5/position/list`.
#[derive(Debug, Deserialize)]
pub struct PositionList {
    #[serde(default)]
    pub list: Vec<PositionEntry>,
}

/// One position row.
#[derive(Debug, Deserialize)]
pub struct PositionEntry {
    pub symbol: String,
    /// `Buy` (long), `Sell` (short) or `None`/empty (flat).
    #[serde(default)]
    pub side: String,
    /// Absolute size as a decimal string.
    #[serde(default)]
    pub size: String,
}

impl PositionEntry {
    /// Size signed by side: positive long, negative short.
    pub fn signed_size(&self) -> GatewayResult<Decimal> {
        let size = if self.size.trim().is_empty() {
            Decimal::ZERO
        } else {
            self.size
                .trim()
                .parse::<Decimal>()
                .map_err(|_| GatewayError::Decode(format!("Invalid position size: {}", self.size)))?
        };
        Ok(match self.side.as_str() {
            "Sell" => -size.abs(),
            "Buy" => size.abs(),
            _ => Decimal::ZERO,
        })
    }
}

impl PositionList {
    /// Signed size on `symbol`. An empty list is a flat position.
    pub fn signed_size_for(&self, symbol: &str) -> GatewayResult<Decimal> {
        match self.list.iter().find(|p| p.symbol == symbol) {
            Some(entry) => entry.signed_size(),
            None => Ok(Decimal::ZERO),
        }
    }
}
