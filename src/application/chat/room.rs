//! The chat room: shared collaborators for every session.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::chat::{validate_nickname, MessagePipeline};
use crate::domain::identity::IdentityIssuer;
use crate::ports::{FrameReader, FrameWriter};

use super::broadcaster::Broadcaster;
use super::mailbox::DEFAULT_MAILBOX_CAPACITY;
use super::session::{reject, ChatSession, SessionEnd, SessionError};

/// Tunables applied to every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomSettings {
    pub mailbox_capacity: usize,
    /// How long a closing session's pump may keep draining.
    pub drain_timeout: Duration,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            drain_timeout: Duration::from_secs(5),
        }
    }
}

/// What a client supplies when it connects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRequest {
    pub nickname: String,
    pub token: Option<String>,
    pub addr: String,
}

/// Owns the broadcaster, identity issuer and message pipeline.
pub struct ChatRoom {
    broadcaster: Arc<Broadcaster>,
    issuer: Arc<IdentityIssuer>,
    pipeline: MessagePipeline,
    settings: RoomSettings,
}

impl ChatRoom {
    pub fn new(
        broadcaster: Arc<Broadcaster>,
        issuer: Arc<IdentityIssuer>,
        pipeline: MessagePipeline,
        settings: RoomSettings,
    ) -> Self {
        Self {
            broadcaster,
            issuer,
            pipeline,
            settings,
        }
    }

    pub fn broadcaster(&self) -> &Arc<Broadcaster> {
        &self.broadcaster
    }

    /// Serves one connection from admission to termination.
    ///
    /// An invalid or already present nickname, or a room that is shutting
    /// down, gets an error notice and a close, without an identity ever
    /// being issued.
    pub async fn serve<R, W>(
        &self,
        request: ConnectRequest,
        reader: R,
        mut writer: W,
    ) -> Result<SessionEnd, SessionError>
    where
        R: FrameReader,
        W: FrameWriter + 'static,
    {
        let nickname = match validate_nickname(&request.nickname) {
            Ok(nickname) => nickname,
            Err(e) => {
                tracing::info!(addr = %request.addr, "Nickname rejected: {}", e);
                reject(&mut writer, &e.to_string()).await;
                return Err(SessionError::InvalidNickname(e));
            }
        };

        if let Err(e) = self.broadcaster.check_admission(&nickname).await {
            tracing::info!(addr = %request.addr, nickname = %nickname, "Admission refused: {}", e);
            reject(&mut writer, &e.to_string()).await;
            return Err(e.into());
        }

        let session = ChatSession::new(
            &self.issuer,
            &nickname,
            request.token.as_deref(),
            &request.addr,
            self.settings.mailbox_capacity,
        );

        tracing::debug!(
            connection_id = %session.connection_id(),
            user_id = %session.user_id(),
            is_new = session.is_new(),
            "Session created"
        );

        session
            .run(
                &self.broadcaster,
                &self.pipeline,
                reader,
                writer,
                self.settings.drain_timeout,
            )
            .await
    }
}
