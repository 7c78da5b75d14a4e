//! WebSocket adapters for the chat room.
//!
//! # Architecture
//!
//! ```text
//!   client ──upgrade──► ws_handler ──► split_socket
//!                                     │          │
//!                            WsFrameReader   WsFrameWriter
//!                                     │          │
//!                                     ▼          ▼
//!                               ChatRoom::serve (session)
//! ```
//!
//! # Components
//!
//! - [`messages`] - JSON wire protocol types
//! - [`transport`] - `FrameReader`/`FrameWriter` over an axum `WebSocket`
//! - [`handler`] - Axum WebSocket upgrade handler

pub mod handler;
pub mod messages;
pub mod transport;

pub use handler::{websocket_router, ws_handler, ConnectParams, WebSocketState};
pub use messages::{encode_server_message, parse_client_frame, ClientChatMessage, ServerChatMessage};
pub use transport::{split_socket, WsFrameReader, WsFrameWriter};
