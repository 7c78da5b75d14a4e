//! Roster HTTP adapter module.
//!
//! Exposes the point-in-time list of connected users.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{UserView, EMPTY_ROSTER_JSON};
pub use handlers::RosterAppState;
pub use routes::roster_routes;
