//! The shared fan-out point for all connected users.
//!
//! # Architecture
//!
//! ```text
//!                 Broadcaster
//!   registry: ConnectionId → (profile, mailbox)
//!     ├── conn-a  ──► mailbox a ──► pump a ──► socket a
//!     ├── conn-b  ──► mailbox b ──► pump b ──► socket b
//!     └── conn-c  ──► mailbox c ──► pump c ──► socket c
//! ```
//!
//! # Thread Safety
//!
//! The registry sits behind a `RwLock`: broadcasts and roster reads share
//! the lock, joins and leaves take it exclusively. A leave therefore either
//! happens before a broadcast (no delivery) or after it (one delivery).
//! Delivery never waits on a recipient: a full mailbox drops the message for
//! that recipient only.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{watch, RwLock};

use crate::domain::chat::{Message, UserProfile};
use crate::domain::foundation::ConnectionId;

use super::mailbox::{Delivery, MailboxSender};

/// Reasons a join is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("nickname '{0}' is already in the chat room")]
    NicknameTaken(String),

    #[error("connection is already registered")]
    AlreadyJoined,

    #[error("the chat room is shutting down")]
    ShuttingDown,
}

/// Per-call delivery counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    /// Recipients whose mailbox was full.
    pub dropped: usize,
    /// Recipients whose pump had already stopped.
    pub closed: usize,
}

struct Member {
    profile: Arc<UserProfile>,
    mailbox: MailboxSender,
}

/// Registry of connected users and message fan-out.
pub struct Broadcaster {
    members: RwLock<HashMap<ConnectionId, Member>>,
    shutdown_tx: watch::Sender<bool>,
}

impl Broadcaster {
    /// Creates an empty broadcaster.
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            members: RwLock::new(HashMap::new()),
            shutdown_tx,
        }
    }

    /// Registers a connection.
    ///
    /// Refused when the nickname is already present, the connection is
    /// already registered, or shutdown has begun. The nickname check and
    /// the insert happen under one write lock.
    pub async fn join(
        &self,
        connection_id: ConnectionId,
        profile: Arc<UserProfile>,
        mailbox: MailboxSender,
    ) -> Result<(), JoinError> {
        let mut members = self.members.write().await;

        if self.is_shutting_down() {
            return Err(JoinError::ShuttingDown);
        }
        if members.contains_key(&connection_id) {
            return Err(JoinError::AlreadyJoined);
        }
        if members.values().any(|m| m.profile.nickname == profile.nickname) {
            return Err(JoinError::NicknameTaken(profile.nickname.clone()));
        }

        tracing::info!(
            connection_id = %connection_id,
            user_id = %profile.user_id,
            nickname = %profile.nickname,
            "User joined"
        );
        members.insert(connection_id, Member { profile, mailbox });
        Ok(())
    }

    /// Tells whether a connection using `nickname` would be admitted now.
    ///
    /// Runs before an identity is issued so refused clients never consume
    /// one. [`join`](Self::join) repeats the check under its write lock,
    /// which settles races between concurrent arrivals.
    pub async fn check_admission(&self, nickname: &str) -> Result<(), JoinError> {
        if self.is_shutting_down() {
            return Err(JoinError::ShuttingDown);
        }
        if self.is_nickname_taken(nickname).await {
            return Err(JoinError::NicknameTaken(nickname.to_string()));
        }
        Ok(())
    }

    /// Removes a connection. Removing an absent connection is a no-op.
    ///
    /// Dropping the registry's mailbox handle here is what lets the user's
    /// pump finish once the session drops its own handle.
    pub async fn leave(&self, connection_id: &ConnectionId) -> Option<Arc<UserProfile>> {
        let removed = self.members.write().await.remove(connection_id);

        if let Some(member) = &removed {
            tracing::info!(
                connection_id = %connection_id,
                user_id = %member.profile.user_id,
                "User left"
            );
        }

        removed.map(|m| m.profile)
    }

    /// Offers `message` to every registered mailbox without waiting.
    pub async fn broadcast(&self, message: Arc<Message>) -> BroadcastReport {
        let members = self.members.read().await;
        let mut report = BroadcastReport::default();

        for (connection_id, member) in members.iter() {
            match member.mailbox.offer(message.clone()) {
                Delivery::Delivered => report.delivered += 1,
                Delivery::Full => {
                    report.dropped += 1;
                    tracing::warn!(
                        connection_id = %connection_id,
                        user_id = %member.profile.user_id,
                        "Mailbox full, message dropped"
                    );
                }
                Delivery::Closed => {
                    report.closed += 1;
                    tracing::debug!(connection_id = %connection_id, "Mailbox closed, skipping");
                }
            }
        }

        report
    }

    /// Point-in-time copy of the roster, ordered by entry time then id.
    pub async fn user_list(&self) -> Vec<UserProfile> {
        let mut users: Vec<UserProfile> = self
            .members
            .read()
            .await
            .values()
            .map(|m| m.profile.as_ref().clone())
            .collect();
        users.sort_by(|a, b| a.enter_at.cmp(&b.enter_at).then(a.user_id.cmp(&b.user_id)));
        users
    }

    /// Number of registered connections.
    pub async fn user_count(&self) -> usize {
        self.members.read().await.len()
    }

    /// True when a registered user already uses `nickname`.
    pub async fn is_nickname_taken(&self, nickname: &str) -> bool {
        self.members
            .read()
            .await
            .values()
            .any(|m| m.profile.nickname == nickname)
    }

    /// Asks every session to terminate and refuses further joins.
    pub fn shutdown(&self) {
        tracing::info!("Broadcaster shutting down");
        self.shutdown_tx.send_replace(true);
    }

    /// True once [`shutdown`](Self::shutdown) has been called.
    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Receiver that observes the shutdown flag.
    pub fn subscribe_shutdown(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}
