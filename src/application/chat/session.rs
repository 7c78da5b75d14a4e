//! One connection's lifecycle.
//!
//! A session runs two concurrent halves:
//! 1. Outbound pump: drains the mailbox onto the connection (sole writer)
//! 2. Inbound loop: reads frames, runs them through the pipeline, broadcasts
//!
//! Whatever ends the session (peer close, read or write failure, server
//! shutdown) funnels into a single cleanup pass that leaves the registry,
//! closes the mailbox and lets the pump drain, exactly once.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::chat::{Message, MessagePipeline, UserProfile};
use crate::domain::foundation::{ConnectionId, UserId, ValidationError};
use crate::domain::identity::IdentityIssuer;
use crate::ports::{CloseReason, FrameReader, FrameWriter, TransportError};

use super::broadcaster::{Broadcaster, JoinError};
use super::mailbox::{mailbox, Delivery, MailboxReceiver, MailboxSender};

/// How a session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The client closed the connection or the stream ended.
    PeerClosed,
    /// The server asked every session to stop.
    ServerShutdown,
}

/// Session-fatal conditions.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("nickname rejected: {0}")]
    InvalidNickname(#[source] ValidationError),

    #[error("session rejected: {0}")]
    Rejected(#[from] JoinError),

    #[error("inbound loop failed: {0}")]
    Read(#[source] TransportError),

    #[error("outbound pump failed: {0}")]
    Write(#[source] TransportError),

    #[error("outbound pump aborted: {0}")]
    PumpAborted(String),
}

type PumpHandle<W> = JoinHandle<(W, Result<(), TransportError>)>;

/// A connected user: identity, profile and mailbox.
pub struct ChatSession {
    connection_id: ConnectionId,
    profile: Arc<UserProfile>,
    token: String,
    is_new: bool,
    mailbox: MailboxSender,
    inbox: MailboxReceiver,
}

impl ChatSession {
    /// Builds a session, deriving identity from `token` when it verifies.
    pub fn new(
        issuer: &IdentityIssuer,
        nickname: &str,
        token: Option<&str>,
        addr: &str,
        mailbox_capacity: usize,
    ) -> Self {
        let identity = issuer.issue(token, nickname);
        let (tx, rx) = mailbox(mailbox_capacity);

        Self {
            connection_id: ConnectionId::new(),
            profile: Arc::new(UserProfile::new(identity.user_id, nickname, addr)),
            token: identity.token,
            is_new: identity.is_new,
            mailbox: tx,
            inbox: rx,
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    pub fn user_id(&self) -> UserId {
        self.profile.user_id
    }

    pub fn profile(&self) -> &Arc<UserProfile> {
        &self.profile
    }

    /// Token the client should keep for its next connection.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// True when no valid token was presented.
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Runs the session to completion.
    ///
    /// Greets the user, joins the broadcaster, then runs the pump and the
    /// inbound loop until one of them ends or shutdown is requested.
    pub async fn run<R, W>(
        self,
        broadcaster: &Broadcaster,
        pipeline: &MessagePipeline,
        mut reader: R,
        mut writer: W,
        drain_timeout: Duration,
    ) -> Result<SessionEnd, SessionError>
    where
        R: FrameReader,
        W: FrameWriter + 'static,
    {
        let ChatSession {
            connection_id,
            profile,
            token,
            is_new,
            mailbox,
            inbox,
        } = self;

        // Subscribe before joining so a shutdown in between is still observed.
        let mut shutdown = broadcaster.subscribe_shutdown();

        // Queued before joining so the greeting precedes any broadcast.
        queue_welcome(
            &mailbox,
            connection_id,
            Message::welcome(profile.clone(), token, is_new),
        );

        if let Err(e) = broadcaster
            .join(connection_id, profile.clone(), mailbox.clone())
            .await
        {
            tracing::info!(nickname = %profile.nickname, "Join refused: {}", e);
            reject(&mut writer, &e.to_string()).await;
            return Err(e.into());
        }

        broadcaster
            .broadcast(Arc::new(Message::user_enter(&profile)))
            .await;

        let mut pump: PumpHandle<W> = tokio::spawn(outbound_pump(inbox, writer, connection_id));

        let mut stopped_pump = None;
        let outcome = tokio::select! {
            result = receive_loop(&mut reader, &profile, broadcaster, pipeline) => match result {
                Ok(()) => Ok(SessionEnd::PeerClosed),
                Err(e) => Err(SessionError::Read(e)),
            },
            joined = &mut pump => match joined {
                Ok((_, Err(e))) => Err(SessionError::Write(e)),
                Ok((writer, Ok(()))) => {
                    // The mailbox only closes during cleanup, so this is unexpected.
                    stopped_pump = Some(writer);
                    Err(SessionError::PumpAborted("mailbox closed early".to_string()))
                }
                Err(e) => Err(SessionError::PumpAborted(e.to_string())),
            },
            _ = wait_for_shutdown(&mut shutdown) => Ok(SessionEnd::ServerShutdown),
        };
        let pump_running = matches!(outcome, Ok(_) | Err(SessionError::Read(_)));

        terminate(broadcaster, connection_id, &profile, mailbox).await;

        let writer = if pump_running {
            drain(pump, drain_timeout, connection_id).await
        } else {
            stopped_pump
        };

        if let Some(mut writer) = writer {
            let reason = match outcome {
                Ok(SessionEnd::ServerShutdown) => CloseReason::GoingAway,
                _ => CloseReason::Normal,
            };
            if let Err(e) = writer.close(reason).await {
                tracing::debug!(connection_id = %connection_id, "Close failed: {}", e);
            }
        }

        match &outcome {
            Ok(end) => tracing::info!(
                connection_id = %connection_id,
                user_id = %profile.user_id,
                ?end,
                "Session ended"
            ),
            Err(e) => tracing::warn!(
                connection_id = %connection_id,
                user_id = %profile.user_id,
                "Session terminated: {}",
                e
            ),
        }

        outcome
    }
}

/// Puts the welcome into the session's own mailbox.
///
/// The welcome is the only copy of the reconnect token the client receives,
/// so anything other than `Delivered` is logged as an error.
fn queue_welcome(mailbox: &MailboxSender, connection_id: ConnectionId, welcome: Message) -> Delivery {
    let delivery = mailbox.offer(Arc::new(welcome));
    if delivery != Delivery::Delivered {
        tracing::error!(connection_id = %connection_id, ?delivery, "Welcome could not be queued");
    }
    delivery
}

/// Leaves the registry, closes the mailbox and announces the departure.
///
/// Takes the session's own mailbox handle by value; once it and the
/// registry's handle are gone the pump drains and exits.
async fn terminate(
    broadcaster: &Broadcaster,
    connection_id: ConnectionId,
    profile: &UserProfile,
    mailbox: MailboxSender,
) {
    let was_registered = broadcaster.leave(&connection_id).await.is_some();
    drop(mailbox);

    if was_registered {
        broadcaster
            .broadcast(Arc::new(Message::user_leave(profile)))
            .await;
    }
}

/// Writes a single error notice and closes, for connections that never join.
pub async fn reject<W: FrameWriter>(writer: &mut W, reason: &str) {
    let notice = Message::error(reason);
    if let Err(e) = writer.write_message(&notice).await {
        tracing::debug!("Failed to deliver rejection notice: {}", e);
        return;
    }
    if let Err(e) = writer.close(CloseReason::PolicyViolation(reason.to_string())).await {
        tracing::debug!("Failed to close rejected connection: {}", e);
    }
}

/// Resolves once the shutdown flag is raised or its sender is gone.
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stopping| *stopping).await;
}

/// Reads frames until the peer closes or the transport fails.
async fn receive_loop<R: FrameReader>(
    reader: &mut R,
    sender: &Arc<UserProfile>,
    broadcaster: &Broadcaster,
    pipeline: &MessagePipeline,
) -> Result<(), TransportError> {
    while let Some(frame) = reader.read_frame().await? {
        let message = pipeline.process(&frame.content, frame.client_send_time, sender.clone());
        tracing::trace!(user_id = %sender.user_id, mentions = message.mentions.len(), "Message received");
        broadcaster.broadcast(Arc::new(message)).await;
    }
    Ok(())
}

/// Drains the mailbox onto the connection until every sender is gone.
async fn outbound_pump<W: FrameWriter>(
    mut inbox: MailboxReceiver,
    mut writer: W,
    connection_id: ConnectionId,
) -> (W, Result<(), TransportError>) {
    while let Some(message) = inbox.recv().await {
        if let Err(e) = writer.write_message(&message).await {
            tracing::debug!(connection_id = %connection_id, "Send error, stopping pump: {}", e);
            return (writer, Err(e));
        }
    }
    (writer, Ok(()))
}

/// Waits for the pump to finish draining, aborting it after `timeout`.
async fn drain<W>(
    mut pump: PumpHandle<W>,
    timeout: Duration,
    connection_id: ConnectionId,
) -> Option<W> {
    match tokio::time::timeout(timeout, &mut pump).await {
        Ok(Ok((writer, Ok(())))) => Some(writer),
        Ok(Ok((_, Err(e)))) => {
            tracing::debug!(connection_id = %connection_id, "Drain stopped by write error: {}", e);
            None
        }
        Ok(Err(e)) => {
            tracing::error!(connection_id = %connection_id, "Outbound pump panicked: {}", e);
            None
        }
        Err(_) => {
            tracing::warn!(connection_id = %connection_id, "Outbound pump did not drain in time, aborting");
            pump.abort();
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use secrecy::SecretString;

    use crate::domain::chat::MessageKind;
    use crate::domain::identity::TokenCodec;

    fn issuer() -> IdentityIssuer {
        IdentityIssuer::new(TokenCodec::new(SecretString::new(
            "session_test_secret".to_string(),
        )))
    }

    #[derive(Default)]
    struct RecordingWriter {
        written: Vec<Message>,
        closed: Option<CloseReason>,
    }

    #[async_trait]
    impl FrameWriter for RecordingWriter {
        async fn write_message(&mut self, message: &Message) -> Result<(), TransportError> {
            self.written.push(message.clone());
            Ok(())
        }

        async fn close(&mut self, reason: CloseReason) -> Result<(), TransportError> {
            self.closed = Some(reason);
            Ok(())
        }
    }

    #[test]
    fn new_session_without_token_is_new() {
        let session = ChatSession::new(&issuer(), "alice", None, "127.0.0.1:1", 4);

        assert!(session.is_new());
        assert_eq!(session.user_id(), UserId::new(1));
        assert_eq!(session.profile().nickname, "alice");
        assert!(!session.token().is_empty());
    }

    #[test]
    fn new_session_with_valid_token_recovers_identity() {
        let issuer = issuer();
        let token = issuer.codec().mint(UserId::new(7), "alice");

        let session = ChatSession::new(&issuer, "alice", Some(&token), "127.0.0.1:1", 4);

        assert!(!session.is_new());
        assert_eq!(session.user_id(), UserId::new(7));
        assert_eq!(session.token(), token);
    }

    #[tokio::test]
    async fn welcome_is_queued_first_in_a_fresh_mailbox() {
        let (tx, mut rx) = mailbox(1);
        let profile = Arc::new(UserProfile::new(UserId::new(1), "alice", "127.0.0.1:1"));

        let delivery = queue_welcome(
            &tx,
            ConnectionId::new(),
            Message::welcome(profile, "tok", true),
        );

        assert_eq!(delivery, Delivery::Delivered);
        assert_eq!(rx.recv().await.unwrap().token.as_deref(), Some("tok"));
    }

    #[test]
    fn welcome_into_full_mailbox_reports_the_drop() {
        let (tx, _rx) = mailbox(1);
        tx.offer(Arc::new(Message::error("already queued")));
        let profile = Arc::new(UserProfile::new(UserId::new(1), "alice", "127.0.0.1:1"));

        let delivery = queue_welcome(
            &tx,
            ConnectionId::new(),
            Message::welcome(profile, "tok", true),
        );

        assert_eq!(delivery, Delivery::Full);
    }

    #[tokio::test]
    async fn reject_sends_notice_then_policy_close() {
        let mut writer = RecordingWriter::default();

        reject(&mut writer, "nickname taken").await;

        assert_eq!(writer.written.len(), 1);
        assert_eq!(writer.written[0].kind, MessageKind::Error);
        assert_eq!(writer.written[0].content, "nickname taken");
        assert_eq!(
            writer.closed,
            Some(CloseReason::PolicyViolation("nickname taken".to_string()))
        );
    }

    #[tokio::test]
    async fn pump_stops_when_mailbox_closes() {
        let (tx, rx) = mailbox(4);
        tx.offer(Arc::new(Message::error("one")));
        tx.offer(Arc::new(Message::error("two")));
        drop(tx);

        let (writer, result) =
            outbound_pump(rx, RecordingWriter::default(), ConnectionId::new()).await;

        assert!(result.is_ok());
        let contents: Vec<_> = writer.written.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two"]);
    }
}
