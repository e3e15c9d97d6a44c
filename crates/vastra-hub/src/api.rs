//! REST API server — expose the responder over HTTP.
//!
//! Endpoints:
//! - GET  /           — Minimal chat page
//! - POST /chat       — Send a message and get a reply
//! - GET  /v1/status  — Version, live sessions, metrics
//! - GET  /v1/health  — Health check

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::{Html, Json},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::info;

use vastra_core::Engine;

use crate::metrics::{SharedMetrics, new_metrics};
use crate::middleware::{RateLimiter, logging_middleware, rate_limit_middleware};

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Shared API state.
pub struct AppState {
    pub engine: Arc<Engine>,
    pub metrics: SharedMetrics,
    pub limiter: Option<RateLimiter>,
}

impl AppState {
    /// State with metrics and a rate limiter taken from the engine config.
    pub fn new(engine: Arc<Engine>) -> Self {
        let limiter = RateLimiter::per_minute(engine.config().server.rate_limit_per_minute);
        Self {
            engine,
            metrics: new_metrics(),
            limiter,
        }
    }
}

pub type SharedState = Arc<AppState>;

// ─── Request/Response types ────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub version: String,
    pub status: String,
    pub sessions: usize,
    pub metrics: serde_json::Value,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ─── Handlers ──────────────────────────────────────────────

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn status(State(state): State<SharedState>) -> Json<StatusResponse> {
    let engine = &state.engine;
    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
        sessions: engine.store().len(),
        metrics: state
            .metrics
            .to_json(engine.detector_fallbacks(), engine.store().evicted_total()),
    })
}

async fn chat(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Json(req) = payload.map_err(|rejection| {
        state.metrics.record_bad_request();
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: rejection.body_text(),
            }),
        )
    })?;

    let message = req.message.unwrap_or_default();
    let reply = state
        .engine
        .respond(req.session_id.as_deref(), &message)
        .await;
    state.metrics.record_turn(reply.category);

    Ok(Json(ChatResponse {
        response: reply.response,
        images: reply.images,
    }))
}

// ─── Server builder ────────────────────────────────────────

/// Build the API router.
pub fn build_router(state: SharedState) -> Router {
    let cors = state.engine.config().server.cors;

    let router = Router::new()
        .route("/", get(index))
        .route("/chat", post(chat))
        .route("/v1/health", get(health))
        .route("/v1/status", get(status))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state);

    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Start the API server and, if configured, the session sweeper.
///
/// Returns after Ctrl-C once in-flight requests have drained.
pub async fn start_server(engine: Arc<Engine>, host: &str, port: u16) -> anyhow::Result<()> {
    let memory = engine.config().memory.clone();
    let sweeper = memory.sweep_interval().map(|every| {
        info!("🧹 Session sweeper every {}s", every.as_secs());
        engine.store().start_sweeper(every, memory.capacity_policy())
    });

    let app = build_router(Arc::new(AppState::new(engine)));

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("🌐 API server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    if let Some((handle, shutdown)) = sweeper {
        let _ = shutdown.send(()).await;
        let _ = handle.await;
    }
    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
