//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the core to external systems:
//! - `websocket` - axum WebSocket transport for chat sessions
//! - `http` - REST endpoints and application router

pub mod http;
pub mod websocket;
