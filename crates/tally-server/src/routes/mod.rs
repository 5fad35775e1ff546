//! HTTP route handlers.

pub mod calculator;
pub mod history;

use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
pub struct ApiIndexResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub endpoints: BTreeMap<&'static str, &'static str>,
}

/// GET /api - Describe the available endpoints.
pub async fn api_index() -> Json<ApiIndexResponse> {
    let endpoints = BTreeMap::from([
        ("calculate", "/api/calculator/calculate"),
        ("validate", "/api/calculator/validate"),
        ("clear_history", "/api/calculator/clear"),
        ("history", "/api/history"),
        ("delete_calculation", "/api/history/{id}"),
        ("health", "/api/health"),
    ]);

    Json(ApiIndexResponse {
        name: "Tally Calculator API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints,
    })
}

/// Routes mounted under `/api`.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(api_index))
        // Calculator
        .route("/calculator/calculate", post(calculator::calculate))
        .route("/calculator/validate", post(calculator::validate))
        .route("/calculator/clear", post(calculator::clear))
        // History
        .route("/history", get(history::list))
        .route("/history/", get(history::list))
        .route("/history/{id}", delete(history::delete))
        .route("/health", get(health))
}

/// Full application: API, static UI fallback, CORS and request tracing.
pub fn app(state: Arc<AppState>) -> Router {
    let static_dir = state.config.static_dir.clone();

    Router::new()
        .nest("/api", api_routes())
        .fallback_service(ServeDir::new(static_dir))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
