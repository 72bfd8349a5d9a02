//! Axum router construction for the gateway.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for browser clients.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the gateway.
///
/// The router includes:
/// - `GET /` -- minimal HTML page
/// - `GET /ws` -- `WebSocket` chat connection
/// - `GET /api/session` -- latest session render
/// - `POST /api/messages` -- post a chat message
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/ws", get(ws::ws_chat))
        .route("/api/session", get(handlers::get_session))
        .route("/api/messages", post(handlers::post_message))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
