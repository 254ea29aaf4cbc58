//! Signal translation: the single source of truth for signal semantics.

use sigex_core::{OrderIntent, OrderSide, SignalName};

use crate::error::ExecutorResult;

/// Side and reduce-only flag for a signal name.
///
/// | signal        | side | reduce_only |
/// |---------------|------|-------------|
/// | `ENTER_LONG`  | Buy  | false       |
/// | `ENTER_SHORT` | Sell | false       |
/// | `EXIT_LONG`   | Sell | true        |
/// | `EXIT_SHORT`  | Buy  | true        |
#[must_use]
pub fn intent_for(name: SignalName) -> (OrderSide, bool) {
    match name {
        SignalName::EnterLong => (OrderSide::Buy, false),
        SignalName::EnterShort => (OrderSide::Sell, false),
        SignalName::ExitLong => (OrderSide::Sell, true),
        SignalName::ExitShort => (OrderSide::Buy, true),
    }
}

/// Translate a raw signal name into an order intent for `symbol`.
///
/// # Errors
/// `UnsupportedSignal` unless `raw` is exactly one of the four names.
pub fn translate(symbol: &str, raw: &str) -> ExecutorResult<(SignalName, OrderIntent)> {
    let name: SignalName = raw.parse()?;
    let (side, reduce_only) = intent_for(name);
    Ok((
        name,
        OrderIntent {
            symbol: symbol.to_string(),
            side,
            reduce_only,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExecutorError;

    #[test]
    fn test_fixed_mapping() {
        let cases = [
            ("ENTER_LONG", OrderSide::Buy, false),
            ("ENTER_SHORT", OrderSide::Sell, false),
            ("EXIT_LONG", OrderSide::Sell, true),
            ("EXIT_SHORT", OrderSide::Buy, true),
        ];
        for (raw, side, reduce_only) in cases {
            let (name, intent) = translate("BTCUSDT", raw).unwrap();
            assert_eq!(name.as_str(), raw);
            assert_eq!(intent.side, side, "{raw}");
            assert_eq!(intent.reduce_only, reduce_only, "{raw}");
            assert_eq!(intent.symbol, "BTCUSDT");
        }
    }

    #[test]
    fn test_unknown_names_rejected() {
        for raw in ["", "HOLD", "enter_long", "Enter_Long", "ENTER_LONG "] {
            assert_eq!(
                translate("BTCUSDT", raw),
                Err(ExecutorError::UnsupportedSignal(raw.to_string()))
            );
        }
    }
}
