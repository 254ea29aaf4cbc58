//! Bybit V5 REST client implementing the engine's gateway contract.

use std::sync::Arc;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use sigex_core::{ClientOrderId, ClockState, OrderSpec, PositionSnapshot};
use sigex_executor::{BoxFuture, ExchangeGateway, ExchangeResponse, GatewayError, GatewayResult};

use crate::config::BybitConfig;
use crate::signer::RequestSigner;
use crate::wire::{ApiEnvelope, OrderCreateRequest, PositionList, ServerTime};

const PATH_SERVER_TIME: &str = "/v5/market/time";
const PATH_POSITION_LIST: &str = "/v5/position/list";
const PATH_ORDER_CREATE: &str = "/v5/order/create";

/// Gateway to the Bybit unified trading API.
pub struct BybitGateway {
    client: Client,
    base_url: String,
    category: String,
    signer: RequestSigner,
    clock: Arc<ClockState>,
}

impl BybitGateway {
    /// Build a gateway. `clock` supplies the offset for request timestamps.
    ///
    /// # Errors
    /// `Config` if credentials are missing or the HTTP client cannot be built.
    pub fn new(config: BybitConfig, clock: Arc<ClockState>) -> GatewayResult<Self> {
        if !config.credentials.is_complete() {
            return Err(GatewayError::Config(
                "API key and secret must both be set".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| GatewayError::Config(format!("Failed to create HTTP client: {e}")))?;

        info!(
            base_url = %config.base_url(),
            network = config.network(),
            category = %config.category,
            recv_window_ms = config.recv_window_ms,
            "Bybit gateway configured"
        );

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            category: config.category.clone(),
            signer: RequestSigner::new(config.credentials, config.recv_window_ms),
            clock,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> GatewayResult<Url> {
        Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| GatewayError::Config(format!("Invalid URL for {path}: {e}")))
    }

    async fn read_body(response: reqwest::Response) -> GatewayResult<String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(format!("Failed to read response: {e}")))?;
        if !status.is_success() {
            return Err(GatewayError::Transport(format!("HTTP {status}: {body}")));
        }
        Ok(body)
    }

    fn decode<T: DeserializeOwned>(body: &str) -> GatewayResult<T> {
        serde_json::from_str(body)
            .map_err(|e| GatewayError::Decode(format!("Failed to parse response: {e}")))
    }

    /// Signed GET; the signed payload is the encoded query string.
    async fn signed_get(&self, path: &str, params: &[(&str, &str)]) -> GatewayResult<String> {
        let mut url = self.url(path)?;
        url.query_pairs_mut().extend_pairs(params);
        let query = url.query().unwrap_or_default().to_string();

        let timestamp = self.clock.exchange_now_ms();
        let headers = self.signer.headers(timestamp, &query)?;

        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(format!("HTTP request failed: {e}")))?;
        Self::read_body(response).await
    }

    /// Signed POST; the signed payload is the exact body sent.
    async fn signed_post(&self, path: &str, body: String) -> GatewayResult<String> {
        let url = self.url(path)?;
        let timestamp = self.clock.exchange_now_ms();
        let headers = self.signer.headers(timestamp, &body)?;

        let response = self
            .client
            .post(url)
            .headers(headers)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(format!("HTTP request failed: {e}")))?;
        Self::read_body(response).await
    }

    async fn fetch_server_time(&self) -> GatewayResult<u64> {
        let response = self
            .client
            .get(self.url(PATH_SERVER_TIME)?)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(format!("HTTP request failed: {e}")))?;
        let body = Self::read_body(response).await?;

        let envelope: ApiEnvelope<ServerTime> = Self::decode(&body)?;
        let envelope_time = envelope.time;
        match envelope.into_result()?.as_millis() {
            Ok(ms) => Ok(ms),
            Err(e) => envelope_time.ok_or(e),
        }
    }

    async fn fetch_position(&self, symbol: &str) -> GatewayResult<PositionSnapshot> {
        let body = self
            .signed_get(
                PATH_POSITION_LIST,
                &[("category", self.category.as_str()), ("symbol", symbol)],
            )
            .await?;

        let list: PositionList = Self::decode::<ApiEnvelope<PositionList>>(&body)?.into_result()?;
        let signed_size = list.signed_size_for(symbol)?;
        debug!(symbol = %symbol, signed_size = %signed_size, "Position fetched");
        Ok(PositionSnapshot::new(symbol, signed_size))
    }

    async fn create_order(&self, order: &OrderSpec) -> GatewayResult<ExchangeResponse> {
        let link_id = ClientOrderId::new();
        let request = OrderCreateRequest::from_spec(&self.category, order, &link_id);
        let body = serde_json::to_string(&request)
            .map_err(|e| GatewayError::Decode(format!("Failed to encode order: {e}")))?;

        debug!(
            symbol = %order.symbol,
            order_link_id = %link_id,
            body = %body,
            "Submitting order to Bybit"
        );

        let response = self.signed_post(PATH_ORDER_CREATE, body).await?;
        Self::decode(&response)
    }
}

impl ExchangeGateway for BybitGateway {
    fn get_position<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, GatewayResult<PositionSnapshot>> {
        Box::pin(self.fetch_position(symbol))
    }

    fn submit_order<'a>(
        &'a self,
        order: &'a OrderSpec,
    ) -> BoxFuture<'a, GatewayResult<ExchangeResponse>> {
        Box::pin(self.create_order(order))
    }

    fn server_time_ms(&self) -> BoxFuture<'_, GatewayResult<u64>> {
        Box::pin(self.fetch_server_time())
    }
}
