//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! JSON routes are nested under `/api/`, the telemetry socket lives at
//! `/ws/telemetry`. CORS is permissive for the local UI.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::api::websocket;
use crate::core_state::CoreState;

/// Build the API router.
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params would use `:param` syntax (matchit 0.7 / axum 0.7).
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/analyze", post(endpoints::analysis::analyze))
        .route(
            "/telemetry",
            get(endpoints::telemetry::latest).post(endpoints::telemetry::ingest),
        )
        .route("/telemetry/draft", get(endpoints::telemetry::draft));

    Router::new()
        .nest("/api", api)
        .route("/ws/telemetry", get(websocket::ws_upgrade))
        .with_state(ctx)
        .layer(CorsLayer::permissive())
}
