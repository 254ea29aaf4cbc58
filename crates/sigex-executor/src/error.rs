//! Executor error types.

use sigex_core::CoreError;
use thiserror::Error;

use crate::gateway::GatewayError;

/// Terminal failures of one `Executor::execute` call.
///
/// Validation-stage variants are raised before anything is submitted.
/// Risk-rule violations are not errors; see [`crate::RiskWarning`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Unsupported signal: {0}")]
    UnsupportedSignal(String),

    #[error("Opening signal requires a quantity")]
    MissingQuantity,

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("No open position to close on {symbol}")]
    NoOpenPosition { symbol: String },

    #[error("Position query failed: {0}")]
    PositionQuery(GatewayError),

    /// Non-zero return code on submission. Displays the exchange message verbatim.
    #[error("{message}")]
    ExchangeRejection { code: i64, message: String },

    /// Submission never produced an exchange verdict.
    #[error("{0}")]
    Submission(GatewayError),
}

impl ExecutorError {
    /// True for failures detected before any order was submitted.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_)
                | Self::UnsupportedSignal(_)
                | Self::MissingQuantity
                | Self::InvalidQuantity(_)
                | Self::InvalidPrice(_)
                | Self::NoOpenPosition { .. }
        )
    }

    /// Short label for metrics and logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "missing_field",
            Self::UnsupportedSignal(_) => "unsupported_signal",
            Self::MissingQuantity => "missing_quantity",
            Self::InvalidQuantity(_) => "invalid_quantity",
            Self::InvalidPrice(_) => "invalid_price",
            Self::NoOpenPosition { .. } => "no_open_position",
            Self::PositionQuery(_) => "position_query",
            Self::ExchangeRejection { .. } => "exchange_rejection",
            Self::Submission(_) => "submission",
        }
    }
}

impl From<CoreError> for ExecutorError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidPrice(raw) => Self::InvalidPrice(raw),
            CoreError::InvalidSize(raw) => Self::InvalidQuantity(raw),
            CoreError::UnsupportedSignal(raw) => Self::UnsupportedSignal(raw),
        }
    }
}

pub type ExecutorResult<T> = Result<T, ExecutorError>;
