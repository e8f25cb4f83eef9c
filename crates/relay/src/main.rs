//! Same-origin relay for the Sui JSON-RPC endpoint.
//!
//! Request bodies are forwarded untouched and the node's status code and body
//! are mirrored back, so clients see exactly what the node answered.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use reqwest::Client;
use shared::error::ApiError;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

mod config;

use config::load_settings;

const MAX_RPC_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
struct AppState {
    http: Client,
    upstream_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings()?;
    settings.validate()?;

    let state = AppState {
        http: Client::new(),
        upstream_url: settings.upstream_url.clone(),
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(%addr, upstream = %settings.upstream_url, "relay listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/", post(relay_rpc))
        .route("/api/sui", post(relay_rpc))
        .layer(RequestBodyLimitLayer::new(MAX_RPC_BODY_BYTES))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn relay_rpc(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    debug!(bytes = body.len(), "forwarding rpc request");
    let upstream = match state
        .http
        .post(&state.upstream_url)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await
    {
        Ok(upstream) => upstream,
        Err(err) => {
            error!(upstream = %state.upstream_url, error = %err, "sui node unreachable");
            return node_unreachable();
        }
    };

    let status =
        StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let payload = match upstream.bytes().await {
        Ok(payload) => payload,
        Err(err) => {
            error!(%status, error = %err, "failed to read sui node response");
            return node_unreachable();
        }
    };

    debug!(%status, bytes = payload.len(), "relayed rpc response");
    (
        status,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )],
        payload,
    )
        .into_response()
}

fn node_unreachable() -> Response {
    (StatusCode::GATEWAY_TIMEOUT, Json(ApiError::node_unreachable())).into_response()
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
