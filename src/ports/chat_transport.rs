//! Chat transport ports - the boundary between a session and its connection.
//!
//! A connection is split into a read half and a write half so the inbound
//! loop and the outbound pump can own one each. The read half distinguishes
//! an orderly close (`Ok(None)`) from every other failure (`Err`).
//!
//! ```text
//!   FrameReader ──► inbound loop ──► Broadcaster
//!                                        │
//!   FrameWriter ◄── outbound pump ◄── mailbox
//! ```

use async_trait::async_trait;

use crate::domain::chat::Message;
use crate::domain::foundation::Timestamp;

/// One structured frame received from a client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InboundFrame {
    pub content: String,
    pub client_send_time: Option<Timestamp>,
}

impl InboundFrame {
    /// Convenience constructor.
    pub fn new(content: impl Into<String>, client_send_time: Option<Timestamp>) -> Self {
        Self {
            content: content.into(),
            client_send_time,
        }
    }
}

/// Why the server is closing a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// Session finished normally.
    Normal,
    /// The client broke an admission rule (bad or duplicate nickname).
    PolicyViolation(String),
    /// The server is shutting down.
    GoingAway,
}

/// Errors raised by a transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Reading failed for a reason other than an orderly close.
    #[error("Transport read failed: {0}")]
    Read(String),

    /// Writing to the peer failed.
    #[error("Transport write failed: {0}")]
    Write(String),

    /// A frame arrived but could not be decoded.
    #[error("Malformed frame: {0}")]
    Malformed(String),
}

/// Read half of a chat connection.
#[async_trait]
pub trait FrameReader: Send {
    /// Waits for the next frame.
    ///
    /// Returns `Ok(None)` when the peer closed normally or the stream ended.
    async fn read_frame(&mut self) -> Result<Option<InboundFrame>, TransportError>;
}

/// Write half of a chat connection.
///
/// Only the owning session's outbound pump writes through it, except for
/// the admission error written before the pump starts.
#[async_trait]
pub trait FrameWriter: Send {
    /// Serializes and sends one message.
    async fn write_message(&mut self, message: &Message) -> Result<(), TransportError>;

    /// Sends a close notification. Best effort.
    async fn close(&mut self, reason: CloseReason) -> Result<(), TransportError>;
}
