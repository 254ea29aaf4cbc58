//! Application wiring and lifecycle.

use std::sync::Arc;

use tracing::{error, info, warn};

use sigex_bybit::BybitGateway;
use sigex_core::ClockState;
use sigex_executor::{DynGateway, Executor};

use crate::config::AppConfig;
use crate::error::AppResult;

/// Main application.
pub struct Application {
    config: AppConfig,
    gateway: DynGateway,
    executor: Executor,
}

impl Application {
    /// Build the gateway and engine around one shared clock state.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let clock = Arc::new(ClockState::with_system_clock());
        let gateway: DynGateway = Arc::new(BybitGateway::new(
            config.exchange.to_bybit_config(),
            clock.clone(),
        )?);
        Ok(Self::with_gateway(config, gateway, clock))
    }

    /// Build around an existing gateway.
    pub fn with_gateway(config: AppConfig, gateway: DynGateway, clock: Arc<ClockState>) -> Self {
        let executor = Executor::new(gateway.clone(), clock);
        Self {
            config,
            gateway,
            executor,
        }
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Best-effort initial clock sync.
    pub async fn sync_clock(&self) {
        match self
            .executor
            .clock_guard()
            .sync_clock(self.gateway.as_ref(), false)
            .await
        {
            Ok(Some(offset_ms)) => info!(offset_ms, "Initial clock sync complete"),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Initial clock sync failed, continuing with zero offset"),
        }
    }

    /// Serve webhooks until Ctrl-C.
    pub async fn run(self) -> AppResult<()> {
        info!(
            network = if self.config.exchange.testnet { "testnet" } else { "mainnet" },
            category = %self.config.exchange.category,
            recv_window_ms = self.config.exchange.recv_window_ms,
            "Starting execution service"
        );

        self.sync_clock().await;

        sigex_webhook::run_server(self.executor, self.config.webhook, shutdown_signal()).await?;

        info!("Shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!(error = %e, "Failed to listen for Ctrl-C"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigex_executor::{GatewayError, MockGateway};

    #[tokio::test]
    async fn test_initial_sync_sets_offset() {
        let clock = Arc::new(ClockState::with_system_clock());
        let gateway = Arc::new(MockGateway::new());
        gateway.set_server_time(clock.local_now_ms() + 60_000);

        let app = Application::with_gateway(AppConfig::default(), gateway.clone(), clock.clone());
        app.sync_clock().await;

        assert!(clock.offset_ms() > 55_000);
        assert_eq!(gateway.time_query_count(), 1);
    }

    #[tokio::test]
    async fn test_initial_sync_failure_is_not_fatal() {
        let clock = Arc::new(ClockState::with_system_clock());
        let gateway = Arc::new(MockGateway::new());
        gateway.fail_server_time(GatewayError::Transport("unreachable".to_string()));

        let app = Application::with_gateway(AppConfig::default(), gateway, clock.clone());
        app.sync_clock().await;

        assert_eq!(clock.offset_ms(), 0);
    }

    #[test]
    fn test_missing_credentials_fail_fast() {
        assert!(Application::new(AppConfig::default()).is_err());
    }
}
