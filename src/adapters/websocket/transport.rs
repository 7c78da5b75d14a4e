//! axum WebSocket implementation of the chat transport ports.

use std::borrow::Cow;

use async_trait::async_trait;
use axum::extract::ws::{close_code, CloseFrame, Message as WsMessage, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};

use crate::domain::chat::Message;
use crate::ports::{CloseReason, FrameReader, FrameWriter, InboundFrame, TransportError};

use super::messages::{encode_server_message, parse_client_frame};

/// Splits an upgraded socket into port implementations.
pub fn split_socket(socket: WebSocket) -> (WsFrameReader, WsFrameWriter) {
    let (sink, stream) = socket.split();
    (WsFrameReader { stream }, WsFrameWriter { sink })
}

/// Read half of a WebSocket connection.
pub struct WsFrameReader {
    stream: SplitStream<WebSocket>,
}

#[async_trait]
impl FrameReader for WsFrameReader {
    async fn read_frame(&mut self) -> Result<Option<InboundFrame>, TransportError> {
        loop {
            match self.stream.next().await {
                Some(Ok(WsMessage::Text(text))) => return parse_client_frame(text.as_bytes()).map(Some),
                Some(Ok(WsMessage::Binary(bytes))) => return parse_client_frame(&bytes).map(Some),
                // Protocol ping/pong is answered by axum
                Some(Ok(WsMessage::Ping(_))) | Some(Ok(WsMessage::Pong(_))) => continue,
                Some(Ok(WsMessage::Close(frame))) => {
                    tracing::debug!(?frame, "Client sent close frame");
                    return Ok(None);
                }
                Some(Err(e)) => return Err(TransportError::Read(e.to_string())),
                None => return Ok(None),
            }
        }
    }
}

/// Close frame reasons are limited to 123 bytes by RFC 6455.
const MAX_CLOSE_REASON_BYTES: usize = 123;

fn truncate_reason(mut text: String) -> String {
    if text.len() > MAX_CLOSE_REASON_BYTES {
        let mut end = MAX_CLOSE_REASON_BYTES;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
    }
    text
}

/// Write half of a WebSocket connection.
pub struct WsFrameWriter {
    sink: SplitSink<WebSocket, WsMessage>,
}

#[async_trait]
impl FrameWriter for WsFrameWriter {
    async fn write_message(&mut self, message: &Message) -> Result<(), TransportError> {
        let json = encode_server_message(message)?;
        self.sink
            .send(WsMessage::Text(json))
            .await
            .map_err(|e| TransportError::Write(e.to_string()))
    }

    async fn close(&mut self, reason: CloseReason) -> Result<(), TransportError> {
        let frame = match reason {
            CloseReason::Normal => CloseFrame {
                code: close_code::NORMAL,
                reason: Cow::Borrowed(""),
            },
            CloseReason::PolicyViolation(text) => CloseFrame {
                code: close_code::POLICY,
                reason: Cow::Owned(truncate_reason(text)),
            },
            CloseReason::GoingAway => CloseFrame {
                code: close_code::AWAY,
                reason: Cow::Borrowed("server shutting down"),
            },
        };
        self.sink
            .send(WsMessage::Close(Some(frame)))
            .await
            .map_err(|e| TransportError::Write(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_reasons_are_kept() {
        assert_eq!(truncate_reason("nickname taken".to_string()), "nickname taken");
    }

    #[test]
    fn long_reasons_are_cut_on_a_char_boundary() {
        let reason = truncate_reason("字".repeat(60));
        assert!(reason.len() <= MAX_CLOSE_REASON_BYTES);
        assert_eq!(reason.chars().count(), 41);
    }
}
