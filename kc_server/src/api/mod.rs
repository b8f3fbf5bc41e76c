//! HTTP/WebSocket API for the game server.
//!
//! Three surfaces: a health check, the WebSocket endpoint carrying all
//! game traffic, and the static client bundle served at the web root.

pub mod rate_limiter;
pub mod websocket;

use std::path::Path;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use king_chu::{RoomHandle, RoomMessage};
use serde_json::json;
use tokio::sync::oneshot;
use tower_http::{cors::CorsLayer, services::ServeDir};

/// Shared application state, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub room: RoomHandle,
    /// Outbound queue depth for each WebSocket connection.
    pub ws_queue_depth: usize,
}

/// Build the router: health check, WebSocket endpoint, and the static
/// client bundle as fallback.
pub fn create_router(state: AppState, public_dir: &Path) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(websocket::websocket_handler))
        .fallback_service(ServeDir::new(public_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check. Round-trips through the room actor so a wedged room
/// reports as unhealthy.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (tx, rx) = oneshot::channel();
    let status = match state.room.send(RoomMessage::GetStatus { response: tx }).await {
        Ok(()) => rx.await.ok(),
        Err(_) => None,
    };

    let status_code = if status.is_some() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = json!({
        "status": if status.is_some() { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "room": status,
    });
    (status_code, Json(body))
}
