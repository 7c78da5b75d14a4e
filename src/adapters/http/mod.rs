//! HTTP adapters - REST API implementations.
//!
//! Each feature has its own HTTP adapter; [`app_router`] assembles them
//! with the WebSocket endpoint into the served application.

pub mod roster;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::adapters::websocket::{websocket_router, WebSocketState};
use crate::application::chat::ChatRoom;

pub use roster::{roster_routes, RosterAppState};

/// Builds the full HTTP application for `room`.
pub fn app_router(room: Arc<ChatRoom>) -> Router {
    let roster_state = RosterAppState::new(room.broadcaster().clone());

    Router::new()
        .merge(roster_routes(roster_state))
        .merge(websocket_router(WebSocketState::new(room)))
        .layer(TraceLayer::new_for_http())
}
