//! Webhook listener errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

pub type WebhookResult<T> = Result<T, WebhookError>;
