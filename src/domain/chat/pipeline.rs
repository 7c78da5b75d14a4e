//! Inbound text to `Message` transformation.

use std::sync::Arc;

use crate::domain::foundation::Timestamp;

use super::content_filter::{ContentFilter, NoopFilter};
use super::mentions::extract_mentions;
use super::message::Message;
use super::user::UserProfile;

/// Filters content, extracts mentions and stamps the receive time.
///
/// Pure and shareable: holds only the immutable filter policy.
#[derive(Clone)]
pub struct MessagePipeline {
    filter: Arc<dyn ContentFilter>,
}

impl MessagePipeline {
    /// Creates a pipeline using `filter`.
    pub fn new(filter: Arc<dyn ContentFilter>) -> Self {
        Self { filter }
    }

    /// Builds the message `sender` wrote.
    pub fn process(
        &self,
        raw_content: &str,
        client_send_time: Option<Timestamp>,
        sender: Arc<UserProfile>,
    ) -> Message {
        let content = self.filter.filter(raw_content);
        let mentions = extract_mentions(&content);
        Message::normal(sender, content, mentions, client_send_time)
    }
}

impl Default for MessagePipeline {
    fn default() -> Self {
        Self::new(Arc::new(NoopFilter))
    }
}

impl std::fmt::Debug for MessagePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagePipeline").finish_non_exhaustive()
    }
}
