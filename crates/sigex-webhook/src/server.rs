//! HTTP server implementation using axum.

use std::future::Future;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use sigex_executor::{ExecutorError, Executor};
use sigex_telemetry::Metrics;

use crate::config::WebhookConfig;
use crate::error::{WebhookError, WebhookResult};
use crate::types::{ErrorResponse, HealthResponse, SuccessResponse, WebhookRequest};

/// Shared application state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    executor: Executor,
}

impl AppState {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

/// Create the axum router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(handle_webhook))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 400 for validation-stage failures, 500 for position query and submission failures.
fn status_for(err: &ExecutorError) -> StatusCode {
    if err.is_validation() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

async fn handle_webhook(State(state): State<AppState>, body: Bytes) -> Response {
    let request: WebhookRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            warn!(error = %e, "Malformed webhook body");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(format!("Invalid request body: {e}"), None)),
            )
                .into_response();
        }
    };

    let signal = request.into_signal();
    info!(
        symbol = %signal.symbol,
        signal = %signal.signal,
        qty = ?signal.quantity,
        price = ?signal.price,
        "Webhook signal received"
    );

    // Detached so a client disconnect cannot cancel a submission in flight.
    let executor = state.executor.clone();
    let task_signal = signal.clone();
    let outcome = tokio::spawn(async move { executor.execute(&task_signal).await }).await;
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(symbol = %signal.symbol, signal = %signal.signal, error = %e, "Execution task failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    format!("Execution task failed: {e}"),
                    Some(signal.signal.clone()),
                )),
            )
                .into_response();
        }
    };

    match outcome {
        Ok(report) => (StatusCode::OK, Json(SuccessResponse::from(&report))).into_response(),
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                error!(symbol = %signal.symbol, signal = %signal.signal, error = %e, "Order execution failed");
            } else {
                warn!(symbol = %signal.symbol, signal = %signal.signal, error = %e, "Signal rejected");
            }
            let name = (!signal.signal.is_empty()).then(|| signal.signal.clone());
            (status, Json(ErrorResponse::new(e.to_string(), name))).into_response()
        }
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

async fn metrics() -> Response {
    match Metrics::render() {
        Ok(text) => ([(header::CONTENT_TYPE, Metrics::content_type())], text).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// Bind and serve until `shutdown` resolves.
pub async fn run_server<F>(executor: Executor, config: WebhookConfig, shutdown: F) -> WebhookResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(AppState::new(executor));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| WebhookError::Bind {
            addr: addr.clone(),
            source,
        })?;

    info!(addr = %addr, "Webhook listener started: POST /webhook");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Webhook listener stopped");
    Ok(())
}
