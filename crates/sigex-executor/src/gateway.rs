//! Exchange gateway contract consumed by the engine.
//!
//! Provides a trait-based abstraction over the exchange's REST transport,
//! signing and wire encoding. This allows for:
//! - Injecting the gateway into the executor instead of a global client
//! - Scripted test doubles returning arbitrary `retCode`/`retMsg` sequences

use std::collections::{HashMap, VecDeque};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sigex_core::{Clock, OrderSpec, PositionSnapshot, SystemClock};

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Failure to obtain an answer from the exchange.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Network, timeout or non-2xx HTTP status.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Non-zero return code on a query endpoint.
    #[error("Exchange API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("Gateway configuration error: {0}")]
    Config(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Envelope returned by the exchange for an order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeResponse {
    #[serde(rename = "retCode")]
    pub ret_code: i64,
    #[serde(rename = "retMsg", default)]
    pub ret_msg: String,
    #[serde(default)]
    pub result: serde_json::Value,
}

impl ExchangeResponse {
    pub const SUCCESS_CODE: i64 = 0;

    /// Successful response carrying `result`.
    pub fn ok(result: serde_json::Value) -> Self {
        Self {
            ret_code: Self::SUCCESS_CODE,
            ret_msg: "OK".to_string(),
            result,
        }
    }

    /// Rejection with the given code and message.
    pub fn rejected(code: i64, message: impl Into<String>) -> Self {
        Self {
            ret_code: code,
            ret_msg: message.into(),
            result: serde_json::Value::Null,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.ret_code == Self::SUCCESS_CODE
    }
}

/// Contract the engine requires from an exchange.
///
/// Timeouts are the implementation's transport concern; the engine adds
/// none of its own.
pub trait ExchangeGateway: Send + Sync {
    /// Current position on `symbol`.
    fn get_position<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, GatewayResult<PositionSnapshot>>;

    /// Submit an order. A non-zero `ret_code` is returned as `Ok`.
    fn submit_order<'a>(&'a self, order: &'a OrderSpec)
        -> BoxFuture<'a, GatewayResult<ExchangeResponse>>;

    /// Exchange server time in milliseconds since Unix epoch.
    fn server_time_ms(&self) -> BoxFuture<'_, GatewayResult<u64>>;
}

/// Arc wrapper for gateway trait objects.
pub type DynGateway = Arc<dyn ExchangeGateway>;

/// Scripted gateway for tests and dry runs.
///
/// Submissions pop scripted results in order; once the script is empty
/// every submission succeeds with a synthetic order id.
pub struct MockGateway {
    positions: parking_lot::Mutex<HashMap<String, Decimal>>,
    position_error: parking_lot::Mutex<Option<GatewayError>>,
    submit_script: parking_lot::Mutex<VecDeque<GatewayResult<ExchangeResponse>>>,
    submitted: parking_lot::Mutex<Vec<OrderSpec>>,
    server_time: parking_lot::Mutex<Option<GatewayResult<u64>>>,
    clock: Arc<dyn Clock>,
    position_queries: AtomicUsize,
    time_queries: AtomicUsize,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    /// Create a mock whose server time follows the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a mock whose server time follows `clock` unless overridden.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            positions: parking_lot::Mutex::new(HashMap::new()),
            position_error: parking_lot::Mutex::new(None),
            submit_script: parking_lot::Mutex::new(VecDeque::new()),
            submitted: parking_lot::Mutex::new(Vec::new()),
            server_time: parking_lot::Mutex::new(None),
            clock,
            position_queries: AtomicUsize::new(0),
            time_queries: AtomicUsize::new(0),
        }
    }

    /// Set the signed position size for `symbol`.
    pub fn set_position(&self, symbol: &str, signed_size: Decimal) {
        self.positions.lock().insert(symbol.to_string(), signed_size);
    }

    /// Make every position query fail with `error`.
    pub fn fail_positions(&self, error: GatewayError) {
        *self.position_error.lock() = Some(error);
    }

    /// Queue the result of the next unscripted submission.
    pub fn push_submit_response(&self, response: ExchangeResponse) {
        self.submit_script.lock().push_back(Ok(response));
    }

    /// Queue a transport-level failure for the next submission.
    pub fn push_submit_error(&self, error: GatewayError) {
        self.submit_script.lock().push_back(Err(error));
    }

    /// Pin the reported server time.
    pub fn set_server_time(&self, time_ms: u64) {
        *self.server_time.lock() = Some(Ok(time_ms));
    }

    /// Make server time queries fail.
    pub fn fail_server_time(&self, error: GatewayError) {
        *self.server_time.lock() = Some(Err(error));
    }

    /// Orders received so far, in submission order.
    pub fn submitted_orders(&self) -> Vec<OrderSpec> {
        self.submitted.lock().clone()
    }

    pub fn submit_count(&self) -> usize {
        self.submitted.lock().len()
    }

    pub fn position_query_count(&self) -> usize {
        self.position_queries.load(Ordering::SeqCst)
    }

    pub fn time_query_count(&self) -> usize {
        self.time_queries.load(Ordering::SeqCst)
    }

    /// Total number of calls of any kind.
    pub fn call_count(&self) -> usize {
        self.submit_count() + self.position_query_count() + self.time_query_count()
    }
}

impl ExchangeGateway for MockGateway {
    fn get_position<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, GatewayResult<PositionSnapshot>> {
        Box::pin(async move {
            self.position_queries.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = self.position_error.lock().clone() {
                return Err(err);
            }
            let size = self
                .positions
                .lock()
                .get(symbol)
                .copied()
                .unwrap_or(Decimal::ZERO);
            Ok(PositionSnapshot::new(symbol, size))
        })
    }

    fn submit_order<'a>(
        &'a self,
        order: &'a OrderSpec,
    ) -> BoxFuture<'a, GatewayResult<ExchangeResponse>> {
        Box::pin(async move {
            let seq = {
                let mut submitted = self.submitted.lock();
                submitted.push(order.clone());
                submitted.len()
            };
            self.submit_script.lock().pop_front().unwrap_or_else(|| {
                Ok(ExchangeResponse::ok(serde_json::json!({
                    "orderId": format!("mock-{seq}"),
                    "orderLinkId": "",
                })))
            })
        })
    }

    fn server_time_ms(&self) -> BoxFuture<'_, GatewayResult<u64>> {
        Box::pin(async move {
            self.time_queries.fetch_add(1, Ordering::SeqCst);
            match self.server_time.lock().clone() {
                Some(result) => result,
                None => Ok(self.clock.now_ms()),
            }
        })
    }
}
