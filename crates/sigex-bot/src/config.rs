//! Application configuration.
//!
//! Path precedence: `--config` > `SIGEX_CONFIG` > `config/default.toml`.
//! Credentials come from `BYBIT_API_KEY` / `BYBIT_API_SECRET` when set, and
//! `BYBIT_TESTNET=true` forces testnet.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use zeroize::Zeroizing;

use sigex_bybit::config::{DEFAULT_CATEGORY, DEFAULT_RECV_WINDOW_MS, DEFAULT_TIMEOUT_MS};
use sigex_bybit::{BybitConfig, Credentials};
use sigex_webhook::WebhookConfig;

use crate::error::{AppError, AppResult};

pub const CONFIG_ENV_VAR: &str = "SIGEX_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

pub const API_KEY_ENV_VAR: &str = "BYBIT_API_KEY";
pub const API_SECRET_ENV_VAR: &str = "BYBIT_API_SECRET";
pub const TESTNET_ENV_VAR: &str = "BYBIT_TESTNET";

/// Exchange connection settings.
#[derive(Clone, Deserialize)]
pub struct ExchangeConfig {
    #[serde(default)]
    pub testnet: bool,
    /// Overrides the mainnet/testnet REST URL.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_recv_window_ms")]
    pub recv_window_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub api_key: String,
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub api_secret: Zeroizing<String>,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Zeroizing<String>, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(Zeroizing::new)
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_recv_window_ms() -> u64 {
    DEFAULT_RECV_WINDOW_MS
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            testnet: false,
            base_url: None,
            category: default_category(),
            recv_window_ms: default_recv_window_ms(),
            timeout_ms: default_timeout_ms(),
            api_key: String::new(),
            api_secret: Zeroizing::default(),
        }
    }
}

impl fmt::Debug for ExchangeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeConfig")
            .field("testnet", &self.testnet)
            .field("base_url", &self.base_url)
            .field("category", &self.category)
            .field("recv_window_ms", &self.recv_window_ms)
            .field("timeout_ms", &self.timeout_ms)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

impl ExchangeConfig {
    /// Gateway settings.
    pub fn to_bybit_config(&self) -> BybitConfig {
        BybitConfig {
            testnet: self.testnet,
            base_url: self.base_url.clone().filter(|u| !u.is_empty()),
            category: self.category.clone(),
            recv_window_ms: self.recv_window_ms,
            timeout_ms: self.timeout_ms,
            credentials: Credentials::new(self.api_key.clone(), self.api_secret.as_str()),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive; `RUST_LOG` still takes precedence.
    #[serde(default)]
    pub log_level: Option<String>,
}

/// Where the loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(String),
    /// No file at the resolved path.
    Defaults(String),
}

impl ConfigSource {
    /// Report the source. Call once logging is up.
    pub fn log(&self) {
        match self {
            Self::File(path) => tracing::info!(path = %path, "Config file loaded"),
            Self::Defaults(path) => {
                tracing::warn!(path = %path, "Config file not found, using defaults")
            }
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Resolve the config path, load it (or defaults) and apply env overrides.
    ///
    /// Runs before logging is initialised, so the source is returned for the
    /// caller to report.
    pub fn load(cli_path: Option<String>) -> AppResult<(Self, ConfigSource)> {
        let path = Self::resolve_path(cli_path, std::env::var(CONFIG_ENV_VAR).ok());

        let (mut config, source) = if Path::new(&path).exists() {
            (Self::from_file(&path)?, ConfigSource::File(path))
        } else {
            (Self::default(), ConfigSource::Defaults(path))
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok((config, source))
    }

    pub fn resolve_path(cli_path: Option<String>, env_path: Option<String>) -> String {
        cli_path
            .or(env_path)
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Overlay credentials and network selection from the environment.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV_VAR).filter(|v| !v.is_empty()) {
            self.exchange.api_key = key;
        }
        if let Some(secret) = lookup(API_SECRET_ENV_VAR).filter(|v| !v.is_empty()) {
            self.exchange.api_secret = Zeroizing::new(secret);
        }
        if lookup(TESTNET_ENV_VAR).as_deref() == Some("true") {
            self.exchange.testnet = true;
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.exchange.recv_window_ms == 0 {
            return Err(AppError::Config("exchange.recv_window_ms must be > 0".to_string()));
        }
        if self.exchange.timeout_ms == 0 {
            return Err(AppError::Config("exchange.timeout_ms must be > 0".to_string()));
        }
        if self.exchange.category.is_empty() {
            return Err(AppError::Config("exchange.category must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(!config.exchange.testnet);
        assert_eq!(config.exchange.category, "linear");
        assert_eq!(config.exchange.recv_window_ms, 20_000);
        assert_eq!(config.exchange.timeout_ms, 10_000);
        assert_eq!(config.webhook.port, 3000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [exchange]
            testnet = true
            recv_window_ms = 5000

            [webhook]
            port = 8088
            "#,
        )
        .unwrap();
        assert!(config.exchange.testnet);
        assert_eq!(config.exchange.recv_window_ms, 5000);
        assert_eq!(config.exchange.category, "linear");
        assert_eq!(config.webhook.port, 8088);
        assert_eq!(config.webhook.host, "0.0.0.0");
        assert!(config.telemetry.log_level.is_none());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            AppConfig::from_toml("[exchange]\ntestnet = \"maybe\""),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (API_KEY_ENV_VAR, "env-key"),
            (API_SECRET_ENV_VAR, "env-secret"),
            (TESTNET_ENV_VAR, "true"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.exchange.api_key = "file-key".to_string();
        config.apply_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.exchange.api_key, "env-key");
        assert_eq!(config.exchange.api_secret.as_str(), "env-secret");
        assert!(config.exchange.testnet);
    }

    #[test]
    fn test_testnet_only_forced_by_true() {
        let mut config = AppConfig::default();
        config.apply_overrides(|name| (name == TESTNET_ENV_VAR).then(|| "1".to_string()));
        assert!(!config.exchange.testnet);
    }

    #[test]
    fn test_path_precedence() {
        assert_eq!(
            AppConfig::resolve_path(Some("cli.toml".into()), Some("env.toml".into())),
            "cli.toml"
        );
        assert_eq!(AppConfig::resolve_path(None, Some("env.toml".into())), "env.toml");
        assert_eq!(AppConfig::resolve_path(None, None), DEFAULT_CONFIG_PATH);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let mut config = ExchangeConfig::default();
        config.api_secret = Zeroizing::new("hunter2".to_string());
        assert!(!format!("{config:?}").contains("hunter2"));
    }

    #[test]
    fn test_secret_deserialized_into_zeroizing_storage() {
        let config = AppConfig::from_toml(
            r#"
            [exchange]
            api_key = "file-key"
            api_secret = "file-secret"
            "#,
        )
        .unwrap();
        let secret: &Zeroizing<String> = &config.exchange.api_secret;
        assert_eq!(secret.as_str(), "file-secret");
        assert!(config.exchange.to_bybit_config().credentials.is_complete());
    }

    #[test]
    fn test_missing_file_reported_as_defaults() {
        let path = "does/not/exist/sigex.toml";
        let (config, source) = AppConfig::load(Some(path.to_string())).unwrap();
        assert_eq!(source, ConfigSource::Defaults(path.to_string()));
        assert_eq!(config.webhook.port, 3000);
    }

    #[test]
    fn test_zero_recv_window_rejected() {
        let mut config = AppConfig::default();
        config.exchange.recv_window_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bybit_config_conversion() {
        let mut config = ExchangeConfig::default();
        config.base_url = Some(String::new());
        config.testnet = true;
        let bybit = config.to_bybit_config();
        assert!(bybit.base_url.is_none());
        assert_eq!(bybit.base_url(), sigex_bybit::TESTNET_URL);
    }
}
