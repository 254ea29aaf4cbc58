//! sigex-webhook - HTTP entry point for trading signals.
//!
//! # Routes
//!
//! ```text
//! POST /webhook  → Executor::execute → 200 / 400 / 500 JSON
//! GET  /health   → liveness
//! GET  /metrics  → Prometheus text
//! ```
//!
//! Requests are executed independently; there is no per-symbol queue.

mod config;
mod error;
mod server;
mod types;

pub use config::WebhookConfig;
pub use error::{WebhookError, WebhookResult};
pub use server::{create_router, run_server, AppState};
pub use types::{ErrorResponse, HealthResponse, SuccessResponse, WebhookRequest};
