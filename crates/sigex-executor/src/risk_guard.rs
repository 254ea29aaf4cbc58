//! Take-profit / stop-loss sanity checks.
//!
//! Levels on the wrong side of the entry price are dropped, never adjusted,
//! and never cause the order itself to be rejected. Each dropped level is
//! reported as a [`RiskWarning`].
//!
//! # Directional Rules
//!
//! | side | take-profit     | stop-loss       |
//! |------|-----------------|-----------------|
//! | Buy  | `tp >= entry`   | `sl <= entry`   |
//! | Sell | `tp <= entry`   | `sl >= entry`   |
//!
//! Without an entry price (market orders) nothing is checked.

use serde::Serialize;
use std::fmt;

use sigex_core::{OrderSide, Price};

/// Which protective level a warning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProtectionField {
    TakeProfit,
    StopLoss,
}

impl ProtectionField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TakeProfit => "takeProfit",
            Self::StopLoss => "stopLoss",
        }
    }
}

impl fmt::Display for ProtectionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-fatal record of a dropped protective level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskWarning {
    pub field: ProtectionField,
    pub value: Price,
    pub entry: Price,
    pub side: OrderSide,
}

impl fmt::Display for RiskWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let relation = match (self.field, self.side) {
            (ProtectionField::TakeProfit, OrderSide::Buy)
            | (ProtectionField::StopLoss, OrderSide::Sell) => ">=",
            (ProtectionField::TakeProfit, OrderSide::Sell)
            | (ProtectionField::StopLoss, OrderSide::Buy) => "<=",
        };
        write!(
            f,
            "{} {} dropped: {} order requires {} {} entry {}",
            self.field, self.value, self.side, self.field, relation, self.entry
        )
    }
}

/// Protective levels after validation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidatedProtection {
    pub take_profit: Option<Price>,
    pub stop_loss: Option<Price>,
    pub warnings: Vec<RiskWarning>,
}

fn level_is_consistent(field: ProtectionField, side: OrderSide, level: Price, entry: Price) -> bool {
    match (field, side) {
        (ProtectionField::TakeProfit, OrderSide::Buy) => level >= entry,
        (ProtectionField::TakeProfit, OrderSide::Sell) => level <= entry,
        (ProtectionField::StopLoss, OrderSide::Buy) => level <= entry,
        (ProtectionField::StopLoss, OrderSide::Sell) => level >= entry,
    }
}

fn check(
    field: ProtectionField,
    side: OrderSide,
    entry: Option<Price>,
    level: Option<Price>,
    warnings: &mut Vec<RiskWarning>,
) -> Option<Price> {
    let level = level?;
    let Some(entry) = entry else {
        return Some(level);
    };
    if level_is_consistent(field, side, level, entry) {
        Some(level)
    } else {
        warnings.push(RiskWarning {
            field,
            value: level,
            entry,
            side,
        });
        None
    }
}

/// Validate take-profit and stop-loss independently against `entry_hint`.
#[must_use]
pub fn validate(
    side: OrderSide,
    entry_hint: Option<Price>,
    take_profit: Option<Price>,
    stop_loss: Option<Price>,
) -> ValidatedProtection {
    let mut warnings = Vec::new();
    let take_profit = check(
        ProtectionField::TakeProfit,
        side,
        entry_hint,
        take_profit,
        &mut warnings,
    );
    let stop_loss = check(
        ProtectionField::StopLoss,
        side,
        entry_hint,
        stop_loss,
        &mut warnings,
    );
    ValidatedProtection {
        take_profit,
        stop_loss,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn px(v: rust_decimal::Decimal) -> Option<Price> {
        Some(Price::new(v))
    }

    #[test]
    fn test_short_take_profit_above_entry_dropped() {
        let out = validate(OrderSide::Sell, px(dec!(100)), px(dec!(110)), None);
        assert!(out.take_profit.is_none());
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].field, ProtectionField::TakeProfit);
    }

    #[test]
    fn test_short_take_profit_below_entry_kept() {
        let out = validate(OrderSide::Sell, px(dec!(100)), px(dec!(90)), None);
        assert_eq!(out.take_profit, px(dec!(90)));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_short_stop_loss_rules() {
        let kept = validate(OrderSide::Sell, px(dec!(100)), None, px(dec!(105)));
        assert_eq!(kept.stop_loss, px(dec!(105)));

        let dropped = validate(OrderSide::Sell, px(dec!(100)), None, px(dec!(95)));
        assert!(dropped.stop_loss.is_none());
        assert_eq!(dropped.warnings[0].field, ProtectionField::StopLoss);
    }

    #[test]
    fn test_long_rules() {
        let ok = validate(OrderSide::Buy, px(dec!(100)), px(dec!(120)), px(dec!(90)));
        assert_eq!(ok.take_profit, px(dec!(120)));
        assert_eq!(ok.stop_loss, px(dec!(90)));
        assert!(ok.warnings.is_empty());

        let bad = validate(OrderSide::Buy, px(dec!(100)), px(dec!(80)), px(dec!(110)));
        assert!(bad.take_profit.is_none());
        assert!(bad.stop_loss.is_none());
        assert_eq!(bad.warnings.len(), 2);
    }

    #[test]
    fn test_fields_are_judged_independently() {
        let out = validate(OrderSide::Buy, px(dec!(100)), px(dec!(80)), px(dec!(95)));
        assert!(out.take_profit.is_none());
        assert_eq!(out.stop_loss, px(dec!(95)));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_level_equal_to_entry_is_kept() {
        let out = validate(OrderSide::Sell, px(dec!(100)), px(dec!(100)), px(dec!(100)));
        assert_eq!(out.take_profit, px(dec!(100)));
        assert_eq!(out.stop_loss, px(dec!(100)));
    }

    #[test]
    fn test_precision_sensitive_comparison() {
        let out = validate(
            OrderSide::Buy,
            px(dec!(0.30000001)),
            px(dec!(0.3)),
            None,
        );
        assert!(out.take_profit.is_none());
    }

    #[test]
    fn test_no_entry_skips_validation() {
        let out = validate(OrderSide::Sell, None, px(dec!(110)), px(dec!(50)));
        assert_eq!(out.take_profit, px(dec!(110)));
        assert_eq!(out.stop_loss, px(dec!(50)));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_validate_is_deterministic() {
        let first = validate(OrderSide::Sell, px(dec!(100)), px(dec!(110)), px(dec!(120)));
        for _ in 0..10 {
            assert_eq!(
                validate(OrderSide::Sell, px(dec!(100)), px(dec!(110)), px(dec!(120))),
                first
            );
        }
    }

    #[test]
    fn test_warning_message() {
        let out = validate(OrderSide::Sell, px(dec!(100)), px(dec!(110)), None);
        assert_eq!(
            out.warnings[0].to_string(),
            "takeProfit 110 dropped: Sell order requires takeProfit <= entry 100"
        );
    }
}
