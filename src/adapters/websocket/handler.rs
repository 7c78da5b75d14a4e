//! WebSocket upgrade handler for chat connections.
//!
//! Handles the HTTP → WebSocket upgrade and hands the split socket to the
//! chat room, which runs the session until disconnect:
//! 1. Validate nickname and derive identity
//! 2. Join the broadcaster
//! 3. Pump mailbox out / read frames in
//! 4. Leave and close

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ws::WebSocket, ConnectInfo, Query, State, WebSocketUpgrade},
    response::Response,
};
use serde::Deserialize;

use crate::application::chat::{ChatRoom, ConnectRequest};

use super::transport::split_socket;

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub room: Arc<ChatRoom>,
}

impl WebSocketState {
    pub fn new(room: Arc<ChatRoom>) -> Self {
        Self { room }
    }
}

/// Query parameters of the upgrade request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectParams {
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub token: Option<String>,
}

/// Handle WebSocket upgrade requests.
///
/// Route: `GET /ws?nickname=<name>[&token=<token>]`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<WebSocketState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, params, addr, state))
}

/// Runs one established connection to completion.
async fn handle_socket(socket: WebSocket, params: ConnectParams, addr: SocketAddr, state: WebSocketState) {
    let (reader, writer) = split_socket(socket);

    let request = ConnectRequest {
        nickname: params.nickname,
        token: params.token.filter(|t| !t.is_empty()),
        addr: addr.to_string(),
    };

    if let Err(e) = state.room.serve(request, reader, writer).await {
        tracing::debug!(%addr, "Connection finished with error: {}", e);
    }
}

/// Create axum router for the WebSocket endpoint.
pub fn websocket_router(state: WebSocketState) -> axum::Router {
    use axum::routing::get;

    axum::Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_params_default_to_empty() {
        let params: ConnectParams = serde_json::from_str("{}").unwrap();
        assert!(params.nickname.is_empty());
        assert!(params.token.is_none());
    }
}
