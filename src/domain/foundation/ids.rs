//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Numeric identity of a chat participant.
///
/// Stable across reconnects when the client presents a valid token.
/// The value `0` is reserved for the System user and is never issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    /// Identifier of the System sentinel.
    pub const SYSTEM: UserId = UserId(0);

    /// Creates a UserId from a raw value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw numeric value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// True for the reserved System identifier.
    pub fn is_system(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = ValidationError;

    /// Parses a strict decimal identifier (digits only, no sign, no padding spaces).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::invalid_format("user_id", "expected decimal digits"));
        }
        s.parse::<u64>()
            .map(Self)
            .map_err(|e| ValidationError::invalid_format("user_id", e.to_string()))
    }
}

/// Identity of one accepted connection; the registry key.
///
/// Two connections of the same logical user (same `UserId`) get distinct
/// connection ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Creates a new random ConnectionId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_parses_plain_decimal() {
        let id: UserId = "42".parse().unwrap();
        assert_eq!(id.as_u64(), 42);
    }

    #[test]
    fn user_id_rejects_signs_and_garbage() {
        assert!("".parse::<UserId>().is_err());
        assert!("+4".parse::<UserId>().is_err());
        assert!("-4".parse::<UserId>().is_err());
        assert!("4 ".parse::<UserId>().is_err());
        assert!("abc".parse::<UserId>().is_err());
        assert!("99999999999999999999999".parse::<UserId>().is_err());
    }

    #[test]
    fn system_id_is_zero() {
        assert!(UserId::SYSTEM.is_system());
        assert!(!UserId::new(1).is_system());
    }

    #[test]
    fn user_id_serializes_as_number() {
        let json = serde_json::to_string(&UserId::new(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn connection_ids_are_unique() {
        assert_ne!(ConnectionId::new(), ConnectionId::new());
    }

    #[test]
    fn connection_id_display_is_uuid() {
        assert_eq!(ConnectionId::new().to_string().len(), 36);
    }
}
