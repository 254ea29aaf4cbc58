//! Exchange position views.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Size;

/// Raw position as reported by the gateway.
///
/// `signed_size` is positive for long, negative for short, zero when flat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub symbol: String,
    pub signed_size: Decimal,
}

impl PositionSnapshot {
    pub fn new(symbol: impl Into<String>, signed_size: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            signed_size,
        }
    }

    pub fn flat(symbol: impl Into<String>) -> Self {
        Self::new(symbol, Decimal::ZERO)
    }
}

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Long,
    Short,
    None,
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "long"),
            Self::Short => write!(f, "short"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Read-only position view, valid for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Position {
    pub symbol: String,
    pub size: Size,
    pub side: PositionSide,
    pub has_position: bool,
}

impl From<PositionSnapshot> for Position {
    fn from(snapshot: PositionSnapshot) -> Self {
        let side = if snapshot.signed_size.is_zero() {
            PositionSide::None
        } else if snapshot.signed_size.is_sign_positive() {
            PositionSide::Long
        } else {
            PositionSide::Short
        };
        Self {
            symbol: snapshot.symbol,
            size: Size::from_signed(snapshot.signed_size),
            side,
            has_position: side != PositionSide::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_long_position() {
        let pos = Position::from(PositionSnapshot::new("BTCUSDT", dec!(2.5)));
        assert_eq!(pos.side, PositionSide::Long);
        assert_eq!(pos.size, Size::new(dec!(2.5)));
        assert!(pos.has_position);
    }

    #[test]
    fn test_short_position_size_is_absolute() {
        let pos = Position::from(PositionSnapshot::new("BTCUSDT", dec!(-0.75)));
        assert_eq!(pos.side, PositionSide::Short);
        assert_eq!(pos.size, Size::new(dec!(0.75)));
    }

    #[test]
    fn test_flat_position() {
        let pos = Position::from(PositionSnapshot::flat("BTCUSDT"));
        assert_eq!(pos.side, PositionSide::None);
        assert!(!pos.has_position);
        assert!(pos.size.is_zero());
    }
}
