//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Gateway error: {0}")]
    Gateway(#[from] sigex_executor::GatewayError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] sigex_telemetry::TelemetryError),

    #[error("Webhook error: {0}")]
    Webhook(#[from] sigex_webhook::WebhookError),
}

pub type AppResult<T> = Result<T, AppError>;
