//! HTTP DTOs for the roster endpoint.
//!
//! The roster is read-only and the domain profile is already shaped for
//! serialization (token and mailbox are not part of it), so it is
//! re-exported directly.

pub use crate::domain::chat::UserProfile as UserView;

/// Body served when the roster cannot be serialized.
pub const EMPTY_ROSTER_JSON: &str = "[]";
