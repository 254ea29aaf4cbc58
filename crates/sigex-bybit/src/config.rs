//! Gateway connection settings.

use std::time::Duration;

use crate::signer::Credentials;

pub const MAINNET_URL: &str = "https://api.bybit.com";
pub const TESTNET_URL: &str = "https://api-testnet.bybit.com";

pub const DEFAULT_CATEGORY: &str = "linear";
pub const DEFAULT_RECV_WINDOW_MS: u64 = 20_000;
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Settings for [`crate::BybitGateway`], supplied at construction.
#[derive(Debug, Clone)]
pub struct BybitConfig {
    pub testnet: bool,
    /// Overrides the mainnet/testnet URL when set.
    pub base_url: Option<String>,
    /// Product category (`linear` for USDT perpetuals).
    pub category: String,
    pub recv_window_ms: u64,
    /// Per-request transport timeout.
    pub timeout_ms: u64,
    pub credentials: Credentials,
}

impl BybitConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            testnet: false,
            base_url: None,
            category: DEFAULT_CATEGORY.to_string(),
            recv_window_ms: DEFAULT_RECV_WINDOW_MS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            credentials,
        }
    }

    /// Effective REST base URL, without trailing slash.
    pub fn base_url(&self) -> &str {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/'),
            None if self.testnet => TESTNET_URL,
            None => MAINNET_URL,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn network(&self) -> &'static str {
        if self.testnet {
            "testnet"
        } else {
            "mainnet"
        }
    }
}
