//! Market vs. limit selection from the optional price field.

use sigex_core::{OrderType, Price};

use crate::error::ExecutorResult;

/// Outcome of order type selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeSelection {
    pub order_type: OrderType,
    /// Limit price; `Some` iff `order_type == Limit`.
    pub price: Option<Price>,
}

/// Interpret an optional textual price.
///
/// Absent, empty (after trimming) and zero-valued text all mean "no explicit
/// price". Used for the limit price and for take-profit / stop-loss levels.
pub(crate) fn explicit_price(raw: Option<&str>) -> ExecutorResult<Option<Price>> {
    let Some(text) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    let price = Price::parse(text)?;
    Ok((!price.is_zero()).then_some(price))
}

/// Select the order type from the price field.
///
/// # Errors
/// `InvalidPrice` if the field is present, non-empty and not a non-negative
/// decimal.
pub fn select_type(price_field: Option<&str>) -> ExecutorResult<TypeSelection> {
    let price = explicit_price(price_field)?;
    let order_type = if price.is_some() {
        OrderType::Limit
    } else {
        OrderType::Market
    };
    Ok(TypeSelection { order_type, price })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExecutorError;
    use rust_decimal_macros::dec;

    #[test]
    fn test_no_price_is_market() {
        for field in [None, Some(""), Some("   "), Some("0"), Some("0.00")] {
            let selection = select_type(field).unwrap();
            assert_eq!(selection.order_type, OrderType::Market, "{field:?}");
            assert!(selection.price.is_none());
        }
    }

    #[test]
    fn test_explicit_price_is_limit() {
        let selection = select_type(Some("3400.5")).unwrap();
        assert_eq!(selection.order_type, OrderType::Limit);
        assert_eq!(selection.price, Some(Price::new(dec!(3400.5))));
    }

    #[test]
    fn test_unparseable_price_is_rejected() {
        assert_eq!(
            select_type(Some("market")),
            Err(ExecutorError::InvalidPrice("market".to_string()))
        );
        assert!(select_type(Some("-5")).is_err());
    }

    #[test]
    fn test_selection_is_deterministic() {
        let first = select_type(Some("101.25")).unwrap();
        for _ in 0..10 {
            assert_eq!(select_type(Some("101.25")).unwrap(), first);
        }
    }
}
