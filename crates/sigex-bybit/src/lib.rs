//! Bybit V5 REST gateway.
//!
//! Implements [`sigex_executor::ExchangeGateway`] against the unified
//! trading API:
//! - `GET /v5/market/time` for the exchange clock
//! - `GET /v5/position/list` for the open position on a symbol
//! - `POST /v5/order/create` for submissions
//!
//! Private requests are signed with HMAC-SHA256 and stamped with the local
//! clock corrected by the shared [`sigex_core::ClockState`] offset.

pub mod client;
pub mod config;
pub mod signer;
pub mod wire;

pub use client::BybitGateway;
pub use config::{BybitConfig, MAINNET_URL, TESTNET_URL};
pub use signer::{Credentials, RequestSigner};
