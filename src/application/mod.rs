//! Application layer - orchestration of domain operations over ports.
//!
//! The chat services here own all shared mutable state: the connection
//! registry and the identifier counter (through `IdentityIssuer`).

pub mod chat;

pub use chat::{Broadcaster, ChatRoom, ChatSession, ConnectRequest, RoomSettings};
