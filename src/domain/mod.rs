//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `identity` - Reconnect tokens and user identifier issuance
//! - `chat` - Participants, messages, content filtering and mentions

pub mod chat;
pub mod foundation;
pub mod identity;
