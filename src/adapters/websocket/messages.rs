//! WebSocket message types for the chat room.
//!
//! Defines the JSON protocol between server and connected clients:
//! - Client → Server: `{"content": "...", "client_send_time": 1700000000000}`
//! - Server → Client: a chat message with its sender, kind and timestamps

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::chat::{Message, MessageKind, UserProfile};
use crate::domain::foundation::Timestamp;
use crate::ports::{InboundFrame, TransportError};

// ============================================
// Client → Server Messages
// ============================================

/// Chat text sent by a client. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientChatMessage {
    #[serde(default)]
    pub content: String,

    /// Milliseconds since the Unix epoch, as a number or a numeric string.
    #[serde(default, deserialize_with = "lenient_unix_millis")]
    pub client_send_time: Option<Timestamp>,
}

impl From<ClientChatMessage> for InboundFrame {
    fn from(msg: ClientChatMessage) -> Self {
        InboundFrame::new(msg.content, msg.client_send_time)
    }
}

/// Decodes one client frame.
pub fn parse_client_frame(payload: &[u8]) -> Result<InboundFrame, TransportError> {
    serde_json::from_slice::<ClientChatMessage>(payload)
        .map(InboundFrame::from)
        .map_err(|e| TransportError::Malformed(e.to_string()))
}

/// Accepts numbers, numeric strings and null; anything unusable becomes `None`.
fn lenient_unix_millis<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let millis = value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    });
    Ok(millis.and_then(Timestamp::from_unix_millis))
}

// ============================================
// Server → Client Messages
// ============================================

/// Wire form of a [`Message`].
#[derive(Debug, Clone, Serialize)]
pub struct ServerChatMessage<'a> {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub user: &'a UserProfile,
    pub content: &'a str,
    pub mentions: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_send_time: Option<Timestamp>,
    pub server_receive_time: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_new: Option<bool>,
}

impl<'a> From<&'a Message> for ServerChatMessage<'a> {
    fn from(msg: &'a Message) -> Self {
        Self {
            kind: msg.kind,
            user: msg.sender.as_ref(),
            content: &msg.content,
            mentions: &msg.mentions,
            client_send_time: msg.client_send_time,
            server_receive_time: msg.server_receive_time,
            token: msg.token.as_deref(),
            is_new: msg.is_new,
        }
    }
}

/// Serializes a message for the wire.
pub fn encode_server_message(msg: &Message) -> Result<String, TransportError> {
    serde_json::to_string(&ServerChatMessage::from(msg))
        .map_err(|e| TransportError::Write(format!("serialization failed: {e}")))
}
