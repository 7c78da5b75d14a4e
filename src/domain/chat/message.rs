//! Chat messages.
//!
//! A `Message` is immutable once built and is fanned out as `Arc<Message>`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

use super::user::{system_user, UserProfile};

/// What a message represents to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Text written by a participant.
    Normal,
    /// Private greeting sent to a newly admitted user.
    Welcome,
    /// Announcement that a user joined.
    UserEnter,
    /// Announcement that a user left.
    UserLeave,
    /// Private notice about a rejected request.
    Error,
}

/// One chat event.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub kind: MessageKind,
    pub sender: Arc<UserProfile>,
    pub content: String,
    pub mentions: Vec<String>,
    /// Send time reported by the client, when it reported a usable one.
    pub client_send_time: Option<Timestamp>,
    pub server_receive_time: Timestamp,
    /// Reconnect token; only set on a welcome addressed to the token's owner.
    pub token: Option<String>,
    /// Whether the welcomed identity was freshly minted; welcome only.
    pub is_new: Option<bool>,
}

impl Message {
    /// Creates a participant message. Content is expected to be filtered already.
    pub fn normal(
        sender: Arc<UserProfile>,
        content: String,
        mentions: Vec<String>,
        client_send_time: Option<Timestamp>,
    ) -> Self {
        Self {
            kind: MessageKind::Normal,
            sender,
            content,
            mentions,
            client_send_time,
            server_receive_time: Timestamp::now(),
            token: None,
            is_new: None,
        }
    }

    /// Private welcome carrying the recipient's reconnect token.
    ///
    /// The recipient is set as sender so the client learns its own identifier.
    pub fn welcome(recipient: Arc<UserProfile>, token: impl Into<String>, is_new: bool) -> Self {
        let content = if is_new {
            format!("{}, welcome to the chat room!", recipient.nickname)
        } else {
            format!("{}, welcome back!", recipient.nickname)
        };
        Self {
            sender: recipient,
            token: Some(token.into()),
            is_new: Some(is_new),
            ..Self::system(MessageKind::Welcome, content)
        }
    }

    /// Announcement that `user` joined.
    pub fn user_enter(user: &UserProfile) -> Self {
        Self::system(
            MessageKind::UserEnter,
            format!("{} joined the chat room", user.nickname),
        )
    }

    /// Announcement that `user` left.
    pub fn user_leave(user: &UserProfile) -> Self {
        Self::system(
            MessageKind::UserLeave,
            format!("{} left the chat room", user.nickname),
        )
    }

    /// Private error notice.
    pub fn error(content: impl Into<String>) -> Self {
        Self::system(MessageKind::Error, content.into())
    }

    fn system(kind: MessageKind, content: String) -> Self {
        Self {
            kind,
            sender: system_user(),
            content,
            mentions: Vec::new(),
            client_send_time: None,
            server_receive_time: Timestamp::now(),
            token: None,
            is_new: None,
        }
    }

    /// True when the server, not a participant, authored this message.
    pub fn is_from_system(&self) -> bool {
        self.sender.is_system()
    }
}
