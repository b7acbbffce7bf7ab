//! Axum router for the keep-alive server.
//!
//! Two routes: `/` serves a tiny HTML page for browser checks and uptime
//! pingers, `/health` serves machine-readable status.

use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the keep-alive router.
pub fn build_router() -> Router {
    Router::new()
        .route("/", get(keep_alive))
        .route("/health", get(health))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// GET / - Human-visible sign of life.
async fn keep_alive() -> Html<&'static str> {
    Html("<h1>TableTalk is running</h1><p>The bot is alive and polling for updates.</p>")
}

/// GET /health - machine-readable liveness for monitors.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
