//! Request and response bodies.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use sigex_core::TradingSignal;
use sigex_executor::ExecutionReport;

/// Inbound signal as posted by the alerting system.
///
/// Numeric fields accept JSON strings or numbers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    #[serde(default)]
    pub symbol: Option<String>,
    /// Signal name (`ENTER_LONG`, ...).
    #[serde(default)]
    pub side: Option<String>,
    #[serde(default, deserialize_with = "decimal_text")]
    pub qty: Option<String>,
    #[serde(default, deserialize_with = "decimal_text")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "decimal_text")]
    pub take_profit: Option<String>,
    #[serde(default, deserialize_with = "decimal_text")]
    pub stop_loss: Option<String>,
}

/// Accept `"1.5"`, `1.5` or `null`.
fn decimal_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected a decimal string or number, got {other}"
        ))),
    }
}

impl WebhookRequest {
    pub fn into_signal(self) -> TradingSignal {
        TradingSignal {
            symbol: self.symbol.unwrap_or_default(),
            signal: self.side.unwrap_or_default(),
            quantity: self.qty,
            price: self.price,
            take_profit: self.take_profit,
            stop_loss: self.stop_loss,
        }
    }
}

/// 200 body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessResponse {
    pub success: bool,
    /// Exchange result, verbatim.
    pub data: Value,
    pub signal: String,
    pub order_type: String,
    pub warnings: Vec<String>,
    pub attempts: u8,
    pub timestamp: String,
}

impl From<&ExecutionReport> for SuccessResponse {
    fn from(report: &ExecutionReport) -> Self {
        Self {
            success: true,
            data: report.result.clone(),
            signal: report.signal.as_str().to_string(),
            order_type: report.order_type().as_str().to_string(),
            warnings: report.warnings.iter().map(ToString::to_string).collect(),
            attempts: report.attempts,
            timestamp: iso_timestamp(report.completed_at),
        }
    }
}

/// 4xx / 5xx body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<String>,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, signal: Option<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            signal,
            timestamp: iso_timestamp(Utc::now()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: iso_timestamp(Utc::now()),
        }
    }
}

pub(crate) fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
