//! End-to-end execution tests against a scripted gateway.
//!
//! Covers:
//! - Signal table and validation failures (no exchange traffic)
//! - Auto-sized closes from the open position
//! - Market / limit selection and TP/SL dropping
//! - Timestamp-class retry (exactly one) vs. business rejections (none)

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rust_decimal_macros::dec;

use sigex_core::{Clock, ClockState, OrderSide, OrderType, PositionSide, Price, Size, TradingSignal};
use sigex_executor::{
    ExchangeResponse, ExecutorError, Executor, MockGateway, ProtectionField, TIMESTAMP_NUDGE_MS,
};

struct FixedClock(AtomicU64);

impl Clock for FixedClock {
    fn now_ms(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }
}

const BASE_TIME: u64 = 1_700_000_000_000;

struct Harness {
    gateway: Arc<MockGateway>,
    clock: Arc<ClockState>,
    executor: Executor,
}

/// Exchange and local clocks agree, so every sync yields offset 0.
fn harness() -> Harness {
    let local = Arc::new(FixedClock(AtomicU64::new(BASE_TIME)));
    let gateway = Arc::new(MockGateway::with_clock(local.clone()));
    let clock = Arc::new(ClockState::new(local));
    let executor = Executor::new(gateway.clone(), clock.clone());
    Harness {
        gateway,
        clock,
        executor,
    }
}

#[tokio::test]
async fn test_signal_table() {
    let cases = [
        ("ENTER_LONG", OrderSide::Buy, false),
        ("ENTER_SHORT", OrderSide::Sell, false),
        ("EXIT_LONG", OrderSide::Sell, true),
        ("EXIT_SHORT", OrderSide::Buy, true),
    ];
    for (name, side, reduce_only) in cases {
        let h = harness();
        let signal = TradingSignal::new("BTCUSDT", name).with_quantity("1");
        let report = h.executor.execute(&signal).await.unwrap();
        assert_eq!(report.order.side, side, "{name}");
        assert_eq!(report.order.reduce_only, reduce_only, "{name}");
    }
}

#[tokio::test]
async fn test_unsupported_signal_makes_no_calls() {
    let h = harness();
    for name in ["enter_long", "HOLD", "ENTER_LONG "] {
        let signal = TradingSignal::new("BTCUSDT", name).with_quantity("1");
        let err = h.executor.execute(&signal).await.unwrap_err();
        assert_eq!(err, ExecutorError::UnsupportedSignal(name.to_string()));
    }
    assert_eq!(h.gateway.call_count(), 0);
}

#[tokio::test]
async fn test_open_without_quantity_makes_no_calls() {
    let h = harness();
    let err = h
        .executor
        .execute(&TradingSignal::new("BTCUSDT", "ENTER_LONG"))
        .await
        .unwrap_err();
    assert_eq!(err, ExecutorError::MissingQuantity);
    assert!(err.is_validation());
    assert_eq!(h.gateway.call_count(), 0);
}

#[tokio::test]
async fn test_exit_long_resolves_quantity_from_position() {
    let h = harness();
    h.gateway.set_position("BTCUSDT", dec!(2.5));

    let report = h
        .executor
        .execute(&TradingSignal::new("BTCUSDT", "EXIT_LONG"))
        .await
        .unwrap();

    assert_eq!(report.order.quantity, Size::new(dec!(2.5)));
    assert_eq!(report.order.quantity.to_string(), "2.5");
    assert_eq!(report.order.side, OrderSide::Sell);
    assert!(report.order.reduce_only);
    let resolved = report.resolved_close.unwrap();
    assert_eq!(resolved.side, PositionSide::Long);

    let submitted = h.gateway.submitted_orders();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].quantity, Size::new(dec!(2.5)));
}

#[tokio::test]
async fn test_close_resyncs_before_position_query_and_submit() {
    let h = harness();
    h.gateway.set_position("BTCUSDT", dec!(1));
    h.executor
        .execute(&TradingSignal::new("BTCUSDT", "ENTER_LONG").with_quantity("1"))
        .await
        .unwrap();
    let before = h.gateway.time_query_count();

    h.executor
        .execute(&TradingSignal::new("BTCUSDT", "EXIT_LONG"))
        .await
        .unwrap();

    // one resync per private call, even right after the previous signal
    assert_eq!(h.gateway.time_query_count() - before, 2);
    assert_eq!(h.gateway.position_query_count(), 1);
}

#[tokio::test]
async fn test_exit_with_full_close_sentinel_resolves_from_position() {
    let h = harness();
    h.gateway.set_position("ETHUSDT", dec!(-7));

    let report = h
        .executor
        .execute(&TradingSignal::new("ETHUSDT", "EXIT_SHORT").with_quantity("999999"))
        .await
        .unwrap();

    assert_eq!(report.order.quantity, Size::new(dec!(7)));
    assert_eq!(report.order.side, OrderSide::Buy);
    assert_eq!(h.gateway.position_query_count(), 1);
}

#[tokio::test]
async fn test_exit_with_explicit_quantity_skips_position_query() {
    let h = harness();
    let report = h
        .executor
        .execute(&TradingSignal::new("BTCUSDT", "EXIT_LONG").with_quantity("0.4"))
        .await
        .unwrap();

    assert_eq!(report.order.quantity, Size::new(dec!(0.4)));
    assert!(report.resolved_close.is_none());
    assert_eq!(h.gateway.position_query_count(), 0);
}

#[tokio::test]
async fn test_close_without_position_never_submits() {
    let h = harness();
    let err = h
        .executor
        .execute(&TradingSignal::new("BTCUSDT", "EXIT_LONG"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ExecutorError::NoOpenPosition {
            symbol: "BTCUSDT".to_string()
        }
    );
    assert_eq!(h.gateway.submit_count(), 0);
}

#[tokio::test]
async fn test_market_when_price_absent_or_zero() {
    for price in [None, Some(""), Some("0")] {
        let h = harness();
        let mut signal = TradingSignal::new("BTCUSDT", "ENTER_LONG").with_quantity("1");
        if let Some(p) = price {
            signal = signal.with_price(p);
        }

        let report = h.executor.execute(&signal).await.unwrap();
        assert_eq!(report.order_type(), OrderType::Market, "{price:?}");
        assert!(report.order.price.is_none());

        let body = serde_json::to_value(&report.order).unwrap();
        assert!(body.get("price").map_or(true, |v| v.is_null()), "{price:?}");
    }
}

#[tokio::test]
async fn test_limit_when_price_given() {
    let h = harness();
    let signal = TradingSignal::new("ETHUSDT", "ENTER_LONG")
        .with_quantity("1")
        .with_price("3400.5");

    let report = h.executor.execute(&signal).await.unwrap();
    assert_eq!(report.order_type(), OrderType::Limit);
    assert_eq!(report.order.price, Some(Price::new(dec!(3400.5))));
}

#[tokio::test]
async fn test_auto_close_uses_same_type_selection() {
    let h = harness();
    h.gateway.set_position("ETHUSDT", dec!(3));
    let signal = TradingSignal::new("ETHUSDT", "EXIT_LONG").with_price("3500");

    let report = h.executor.execute(&signal).await.unwrap();
    assert_eq!(report.order_type(), OrderType::Limit);
    assert_eq!(report.order.price, Some(Price::new(dec!(3500))));
}

#[tokio::test]
async fn test_short_take_profit_above_entry_dropped() {
    let h = harness();
    let signal = TradingSignal::new("BTCUSDT", "ENTER_SHORT")
        .with_quantity("1")
        .with_price("100")
        .with_take_profit("110");

    let report = h.executor.execute(&signal).await.unwrap();
    assert!(report.order.take_profit.is_none());
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].field, ProtectionField::TakeProfit);
    assert!(h.gateway.submitted_orders()[0].take_profit.is_none());
}

#[tokio::test]
async fn test_short_take_profit_below_entry_retained() {
    let h = harness();
    let signal = TradingSignal::new("BTCUSDT", "ENTER_SHORT")
        .with_quantity("1")
        .with_price("100")
        .with_take_profit("90")
        .with_stop_loss("105");

    let report = h.executor.execute(&signal).await.unwrap();
    assert_eq!(report.order.take_profit, Some(Price::new(dec!(90))));
    assert_eq!(report.order.stop_loss, Some(Price::new(dec!(105))));
    assert!(report.warnings.is_empty());
}

#[tokio::test]
async fn test_market_order_keeps_protection_unchecked() {
    let h = harness();
    let signal = TradingSignal::new("BTCUSDT", "ENTER_SHORT")
        .with_quantity("1")
        .with_take_profit("110");

    let report = h.executor.execute(&signal).await.unwrap();
    assert_eq!(report.order.take_profit, Some(Price::new(dec!(110))));
    assert!(report.warnings.is_empty());
}

#[tokio::test]
async fn test_timestamp_rejection_retried_once_then_succeeds() {
    let h = harness();
    h.gateway
        .push_submit_response(ExchangeResponse::rejected(10002, "timestamp error"));

    let report = h
        .executor
        .execute(&TradingSignal::new("BTCUSDT", "ENTER_LONG").with_quantity("1"))
        .await
        .unwrap();

    assert_eq!(report.attempts, 2);
    assert_eq!(h.gateway.submit_count(), 2);
    assert_eq!(h.clock.offset_ms(), TIMESTAMP_NUDGE_MS);
    // presync + resync
    assert_eq!(h.gateway.time_query_count(), 2);
}

#[tokio::test]
async fn test_second_timestamp_rejection_is_terminal() {
    let h = harness();
    h.gateway
        .push_submit_response(ExchangeResponse::rejected(10002, "timestamp error"));
    h.gateway
        .push_submit_response(ExchangeResponse::rejected(10002, "timestamp error"));

    let err = h
        .executor
        .execute(&TradingSignal::new("BTCUSDT", "ENTER_LONG").with_quantity("1"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ExecutorError::ExchangeRejection {
            code: 10002,
            message: "timestamp error".to_string()
        }
    );
    assert_eq!(h.gateway.submit_count(), 2);
}

#[tokio::test]
async fn test_retry_returns_second_failure_verbatim() {
    let h = harness();
    h.gateway
        .push_submit_response(ExchangeResponse::rejected(10002, "timestamp error"));
    h.gateway
        .push_submit_response(ExchangeResponse::rejected(110007, "ab not enough for new order"));

    let err = h
        .executor
        .execute(&TradingSignal::new("BTCUSDT", "ENTER_LONG").with_quantity("1"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "ab not enough for new order");
    assert_eq!(h.gateway.submit_count(), 2);
}

#[tokio::test]
async fn test_business_rejection_not_retried() {
    let h = harness();
    h.gateway
        .push_submit_response(ExchangeResponse::rejected(110007, "insufficient balance"));

    let err = h
        .executor
        .execute(&TradingSignal::new("BTCUSDT", "ENTER_LONG").with_quantity("1"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ExecutorError::ExchangeRejection {
            code: 110007,
            message: "insufficient balance".to_string()
        }
    );
    assert_eq!(err.to_string(), "insufficient balance");
    assert_eq!(h.gateway.submit_count(), 1);
    assert_eq!(h.clock.offset_ms(), 0);
}

#[tokio::test]
async fn test_concurrent_signals_are_independent() {
    let h = harness();
    h.gateway.set_position("ETHUSDT", dec!(-2));

    let open = TradingSignal::new("BTCUSDT", "ENTER_LONG").with_quantity("1");
    let close = TradingSignal::new("ETHUSDT", "EXIT_SHORT");
    let (a, b) = tokio::join!(h.executor.execute(&open), h.executor.execute(&close));

    assert_eq!(a.unwrap().order.symbol, "BTCUSDT");
    assert_eq!(b.unwrap().order.quantity, Size::new(dec!(2)));
    assert_eq!(h.gateway.submit_count(), 2);
}
