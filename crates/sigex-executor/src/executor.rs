//! Execution orchestrator: one signal in, one order out.
//!
//! # Stage Order (Strict)
//!
//! 1. TRANSLATE       signal name → side / reduce-only      → UnsupportedSignal
//! 2. RESOLVE_QTY     reduce-only without quantity only      → MissingQuantity / NoOpenPosition
//! 3. SELECT_TYPE     price field → Market / Limit           → InvalidPrice
//! 4. VALIDATE_RISK   drop inconsistent TP / SL              (warnings only)
//! 5. PRESYNC         forced clock resync, failure swallowed
//! 6. SUBMIT          attempt 1
//! 7. RESYNC+OFFSET   only after a timestamp-class failure
//! 8. SUBMIT          attempt 2, terminal either way
//!
//! Stages 1–4 never submit anything. At most two submissions per call.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use sigex_core::{ClockState, OrderSpec, OrderType, QuantityRequest, SignalName, TradingSignal};
use sigex_telemetry::Metrics;

use crate::clock_guard::{ClockSkewGuard, RetryPermit};
use crate::error::{ExecutorError, ExecutorResult};
use crate::gateway::{DynGateway, ExchangeResponse};
use crate::order_type::{explicit_price, select_type};
use crate::position_resolver::{
    check_close_direction, quantity_request, PositionResolver, ResolvedClose,
};
use crate::risk_guard::{validate, RiskWarning};
use crate::translator::translate;

/// Hard cap on submissions per `execute` call.
pub const MAX_SUBMIT_ATTEMPTS: u8 = 2;

/// Outcome of a successful execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    pub signal: SignalName,
    /// Order as submitted.
    pub order: OrderSpec,
    /// Exchange result payload, verbatim.
    pub result: serde_json::Value,
    /// Protective levels dropped by the risk guard.
    pub warnings: Vec<RiskWarning>,
    /// Submissions made (1 or 2).
    pub attempts: u8,
    /// Position the quantity was resolved from, for auto-sized closes.
    pub resolved_close: Option<ResolvedClose>,
    pub completed_at: DateTime<Utc>,
}

impl ExecutionReport {
    pub fn order_type(&self) -> OrderType {
        self.order.order_type
    }
}

/// Order built and validated, not yet submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedOrder {
    pub signal: SignalName,
    pub order: OrderSpec,
    pub warnings: Vec<RiskWarning>,
    pub resolved_close: Option<ResolvedClose>,
}

/// Submission phase states.
enum SubmitStage {
    Submit { attempt: u8 },
    Resync { attempt: u8, failure: ExecutorError },
}

/// Turns trading signals into exchange orders.
///
/// Cheap to clone; all clones share the gateway and clock state.
#[derive(Clone)]
pub struct Executor {
    gateway: DynGateway,
    clock_guard: ClockSkewGuard,
    resolver: PositionResolver,
}

impl Executor {
    pub fn new(gateway: DynGateway, clock: Arc<ClockState>) -> Self {
        Self::with_clock_guard(gateway, ClockSkewGuard::new(clock))
    }

    pub fn with_clock_guard(gateway: DynGateway, clock_guard: ClockSkewGuard) -> Self {
        Self {
            resolver: PositionResolver::new(gateway.clone()),
            gateway,
            clock_guard,
        }
    }

    pub fn clock_guard(&self) -> &ClockSkewGuard {
        &self.clock_guard
    }

    /// Execute one signal end to end.
    ///
    /// # Errors
    /// Validation errors before any submission; otherwise the terminal
    /// submission failure, carrying the exchange message verbatim.
    pub async fn execute(&self, signal: &TradingSignal) -> ExecutorResult<ExecutionReport> {
        let prepared = match self.prepare(signal).await {
            Ok(prepared) => prepared,
            Err(e) => {
                Metrics::order_rejected(e.kind());
                return Err(e);
            }
        };

        // PRESYNC
        self.clock_guard.before_call(self.gateway.as_ref()).await;

        let (result, attempts) = self.submit_with_retry(&prepared.order).await?;

        info!(
            symbol = %prepared.order.symbol,
            signal = %prepared.signal,
            side = %prepared.order.side,
            order_type = %prepared.order.order_type,
            qty = %prepared.order.quantity,
            attempts,
            "Order accepted"
        );

        Ok(ExecutionReport {
            signal: prepared.signal,
            order: prepared.order,
            result,
            warnings: prepared.warnings,
            attempts,
            resolved_close: prepared.resolved_close,
            completed_at: Utc::now(),
        })
    }

    /// Run the validation stages and build the order without submitting.
    pub async fn prepare(&self, signal: &TradingSignal) -> ExecutorResult<PreparedOrder> {
        let symbol = signal.symbol.trim();
        if symbol.is_empty() {
            return Err(ExecutorError::MissingField("symbol"));
        }
        if signal.signal.is_empty() {
            return Err(ExecutorError::MissingField("side"));
        }

        // TRANSLATE
        let (name, intent) = translate(symbol, &signal.signal)?;
        Metrics::signal_received(name.as_str());
        debug!(
            symbol = %symbol,
            signal = %name,
            side = %intent.side,
            reduce_only = intent.reduce_only,
            "Signal translated"
        );

        // RESOLVE_QTY
        let (quantity, resolved_close) =
            match quantity_request(&intent, signal.quantity.as_deref())? {
                QuantityRequest::Explicit(size) => (size, None),
                QuantityRequest::ClosePosition => {
                    // Position queries are private calls too.
                    self.clock_guard.before_call(self.gateway.as_ref()).await;
                    let resolved = self.resolver.resolve_close_quantity(symbol).await?;
                    check_close_direction(symbol, intent.side, resolved.side);
                    info!(
                        symbol = %symbol,
                        qty = %resolved.quantity,
                        position_side = %resolved.side,
                        "Close quantity resolved from open position"
                    );
                    (resolved.quantity, Some(resolved))
                }
            };

        // SELECT_TYPE
        let selection = select_type(signal.price.as_deref())?;

        // VALIDATE_RISK
        let protection = validate(
            intent.side,
            selection.price,
            explicit_price(signal.take_profit.as_deref())?,
            explicit_price(signal.stop_loss.as_deref())?,
        );
        for warning in &protection.warnings {
            warn!(symbol = %symbol, warning = %warning, "Protective level dropped");
            Metrics::risk_field_dropped(warning.field.as_str());
        }

        let order = OrderSpec::new(&intent, quantity, selection.price)
            .with_protection(protection.take_profit, protection.stop_loss);

        Ok(PreparedOrder {
            signal: name,
            order,
            warnings: protection.warnings,
            resolved_close,
        })
    }

    /// SUBMIT → {SUCCESS | RETRY_ELIGIBLE → RESYNC+OFFSET → SUBMIT}.
    async fn submit_with_retry(&self, order: &OrderSpec) -> ExecutorResult<(serde_json::Value, u8)> {
        let mut stage = SubmitStage::Submit { attempt: 1 };

        loop {
            stage = match stage {
                SubmitStage::Submit { attempt } => match self.submit_once(order, attempt).await {
                    Ok(result) => return Ok((result, attempt)),
                    Err(failure)
                        if attempt < MAX_SUBMIT_ATTEMPTS && Self::is_timestamp_class(&failure) =>
                    {
                        SubmitStage::Resync { attempt, failure }
                    }
                    Err(failure) => {
                        Metrics::order_rejected(failure.kind());
                        return Err(failure);
                    }
                },
                SubmitStage::Resync { attempt, failure } => {
                    warn!(
                        symbol = %order.symbol,
                        attempt,
                        error = %failure,
                        "Timestamp rejection, resyncing clock before single retry"
                    );
                    let RetryPermit { offset_ms } = self
                        .clock_guard
                        .on_timestamp_failure(self.gateway.as_ref())
                        .await;
                    debug!(symbol = %order.symbol, offset_ms, "Retry authorized");
                    SubmitStage::Submit {
                        attempt: attempt + 1,
                    }
                }
            };
        }
    }

    async fn submit_once(&self, order: &OrderSpec, attempt: u8) -> ExecutorResult<serde_json::Value> {
        debug!(symbol = %order.symbol, attempt, "Submitting order");
        Metrics::order_submitted(order.order_type.as_str());

        let started = Instant::now();
        let response = self.gateway.submit_order(order).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        let outcome = match &response {
            Ok(r) if r.is_success() => "ok",
            _ => "error",
        };
        Metrics::submit_latency(outcome, elapsed_ms);

        match response {
            Ok(ExchangeResponse {
                ret_code, result, ..
            }) if ret_code == ExchangeResponse::SUCCESS_CODE => Ok(result),
            Ok(ExchangeResponse {
                ret_code, ret_msg, ..
            }) => {
                warn!(
                    symbol = %order.symbol,
                    attempt,
                    ret_code,
                    ret_msg = %ret_msg,
                    "Order rejected by exchange"
                );
                Err(ExecutorError::ExchangeRejection {
                    code: ret_code,
                    message: ret_msg,
                })
            }
            Err(e) => {
                warn!(symbol = %order.symbol, attempt, error = %e, "Order submission failed");
                Err(ExecutorError::Submission(e))
            }
        }
    }

    fn is_timestamp_class(failure: &ExecutorError) -> bool {
        match failure {
            ExecutorError::ExchangeRejection { message, .. } => {
                ClockSkewGuard::classify_failure(message)
            }
            ExecutorError::Submission(e) => ClockSkewGuard::classify_failure(&e.to_string()),
            _ => false,
        }
    }
}
