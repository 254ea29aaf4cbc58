//! Quantity resolution for reduce-only orders.
//!
//! Closing signals may omit the quantity (or send the legacy full-close
//! sentinel); the quantity is then the size of the position currently open
//! on the exchange.

use tracing::{debug, warn};

use sigex_core::{
    OrderIntent, OrderSide, Position, PositionSide, QuantityRequest, Size, FULL_CLOSE_SENTINEL,
};

use crate::error::{ExecutorError, ExecutorResult};
use crate::gateway::DynGateway;

/// Decide how the quantity is obtained for `intent`.
///
/// # Errors
/// - `MissingQuantity` for an opening intent without a quantity
/// - `InvalidQuantity` for a present quantity that is not a positive decimal
pub fn quantity_request(intent: &OrderIntent, raw: Option<&str>) -> ExecutorResult<QuantityRequest> {
    let text = raw.map(str::trim).filter(|t| !t.is_empty());
    match text {
        None if intent.reduce_only => Ok(QuantityRequest::ClosePosition),
        None => Err(ExecutorError::MissingQuantity),
        Some(FULL_CLOSE_SENTINEL) if intent.reduce_only => Ok(QuantityRequest::ClosePosition),
        Some(text) => Ok(QuantityRequest::Explicit(Size::parse_positive(text)?)),
    }
}

/// Size and direction of the position a close will flatten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedClose {
    pub quantity: Size,
    pub side: PositionSide,
}

/// Looks up open positions through the gateway. Nothing is cached.
#[derive(Clone)]
pub struct PositionResolver {
    gateway: DynGateway,
}

impl PositionResolver {
    pub fn new(gateway: DynGateway) -> Self {
        Self { gateway }
    }

    /// Fetch the position on `symbol` and return its absolute size.
    ///
    /// # Errors
    /// - `PositionQuery` if the gateway call fails
    /// - `NoOpenPosition` if the position is flat
    pub async fn resolve_close_quantity(&self, symbol: &str) -> ExecutorResult<ResolvedClose> {
        let snapshot = self
            .gateway
            .get_position(symbol)
            .await
            .map_err(ExecutorError::PositionQuery)?;
        let position = Position::from(snapshot);

        debug!(
            symbol = %symbol,
            size = %position.size,
            side = %position.side,
            "Fetched position for close"
        );

        if !position.has_position {
            return Err(ExecutorError::NoOpenPosition {
                symbol: symbol.to_string(),
            });
        }

        Ok(ResolvedClose {
            quantity: position.size,
            side: position.side,
        })
    }
}

/// Warn when a close order would not reduce the resolved position.
///
/// The exchange rejects such reduce-only orders; this only adds context to
/// the log.
pub(crate) fn check_close_direction(symbol: &str, order_side: OrderSide, position: PositionSide) {
    let expected = match position {
        PositionSide::Long => OrderSide::Sell,
        PositionSide::Short => OrderSide::Buy,
        PositionSide::None => return,
    };
    if order_side != expected {
        warn!(
            symbol = %symbol,
            order_side = %order_side,
            position_side = %position,
            "Close order side does not match open position"
        );
    }
}
