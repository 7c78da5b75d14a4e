//! Chat module - participants, messages and the inbound message pipeline.

mod content_filter;
mod mentions;
mod message;
mod nickname;
mod pipeline;
mod user;

pub use content_filter::{ContentFilter, NoopFilter, WordListFilter, REDACTION_CHAR};
pub use mentions::extract_mentions;
pub use message::{Message, MessageKind};
pub use nickname::{validate_nickname, NICKNAME_MAX_CHARS, NICKNAME_MIN_CHARS};
pub use pipeline::MessagePipeline;
pub use user::{system_user, UserProfile, SYSTEM_USER};
