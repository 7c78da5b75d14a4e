//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the core and the outside world. Adapters implement these ports.
//!
//! ## Transport Ports
//!
//! - `FrameReader` - Read half of a client connection
//! - `FrameWriter` - Write half of a client connection

mod chat_transport;

pub use chat_transport::{CloseReason, FrameReader, FrameWriter, InboundFrame, TransportError};
