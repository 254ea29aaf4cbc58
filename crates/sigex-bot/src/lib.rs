//! sigex-bot - webhook-driven order execution service.
//!
//! Wires the components together:
//! - Configuration (TOML + environment overrides)
//! - Bybit gateway and the shared exchange clock offset
//! - Execution engine
//! - Webhook listener

pub mod app;
pub mod config;
pub mod error;

pub use app::Application;
pub use config::{AppConfig, ConfigSource, ExchangeConfig, TelemetryConfig};
pub use error::{AppError, AppResult};
