//! Chatroom - real-time chat with fan-out broadcasting.
//!
//! Clients connect over WebSocket, exchange short text messages through a
//! single broadcaster, and keep their identity across reconnects with a
//! self-certifying HMAC token.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
