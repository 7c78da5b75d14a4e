//! Chat application services - the broadcaster and per-connection sessions.

mod broadcaster;
mod mailbox;
mod room;
mod session;

pub use broadcaster::{BroadcastReport, Broadcaster, JoinError};
pub use mailbox::{mailbox, Delivery, MailboxReceiver, MailboxSender, DEFAULT_MAILBOX_CAPACITY};
pub use room::{ChatRoom, ConnectRequest, RoomSettings};
pub use session::{reject, ChatSession, SessionEnd, SessionError};
