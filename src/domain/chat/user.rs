//! Public profile of a chat participant.

use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::domain::foundation::{Timestamp, UserId};

/// What other participants may know about a user.
///
/// Excludes the reconnect token and the mailbox; this is the shape the
/// roster query and outbound messages expose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    #[serde(rename = "uid")]
    pub user_id: UserId,
    pub nickname: String,
    pub enter_at: Timestamp,
    pub addr: String,
}

impl UserProfile {
    /// Creates a profile for a user connecting now from `addr`.
    pub fn new(user_id: UserId, nickname: impl Into<String>, addr: impl Into<String>) -> Self {
        Self {
            user_id,
            nickname: nickname.into(),
            enter_at: Timestamp::now(),
            addr: addr.into(),
        }
    }

    /// True for the System sentinel.
    pub fn is_system(&self) -> bool {
        self.user_id.is_system()
    }
}

/// Sender of server-originated messages. Lives for the whole process and
/// never has a connection.
pub static SYSTEM_USER: Lazy<Arc<UserProfile>> = Lazy::new(|| {
    Arc::new(UserProfile {
        user_id: UserId::SYSTEM,
        nickname: String::new(),
        enter_at: Timestamp::now(),
        addr: String::new(),
    })
});

/// Returns a handle to the System sentinel.
pub fn system_user() -> Arc<UserProfile> {
    SYSTEM_USER.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_user_is_a_singleton() {
        assert!(Arc::ptr_eq(&system_user(), &system_user()));
        assert!(system_user().is_system());
    }

    #[test]
    fn profile_serializes_roster_fields_only() {
        let profile = UserProfile::new(UserId::new(3), "alice", "127.0.0.1:5000");
        let json = serde_json::to_value(&profile).unwrap();

        assert_eq!(json["uid"], 3);
        assert_eq!(json["nickname"], "alice");
        assert_eq!(json["addr"], "127.0.0.1:5000");
        assert!(json["enter_at"].is_string());
        assert_eq!(json.as_object().unwrap().len(), 4);
    }
}
