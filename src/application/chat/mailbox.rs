//! Per-user bounded outbound queue.
//!
//! Writers never wait: a full mailbox rejects the message instead. The only
//! reader is the owning session's outbound pump. The mailbox closes once
//! every sender handle is dropped, after which the pump drains what is left.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::domain::chat::Message;

/// Default number of pending messages per user.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 32;

/// Outcome of offering a message to a mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// Mailbox full; the message was dropped for this recipient.
    Full,
    /// The pump is gone; the message was dropped.
    Closed,
}

/// Write handle of a mailbox.
#[derive(Debug, Clone)]
pub struct MailboxSender {
    tx: mpsc::Sender<Arc<Message>>,
}

impl MailboxSender {
    /// Enqueues `message` without waiting.
    pub fn offer(&self, message: Arc<Message>) -> Delivery {
        match self.tx.try_send(message) {
            Ok(()) => Delivery::Delivered,
            Err(TrySendError::Full(_)) => Delivery::Full,
            Err(TrySendError::Closed(_)) => Delivery::Closed,
        }
    }

    /// True once the receiving side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Read handle of a mailbox, owned by the outbound pump.
#[derive(Debug)]
pub struct MailboxReceiver {
    rx: mpsc::Receiver<Arc<Message>>,
}

impl MailboxReceiver {
    /// Waits for the next message, in arrival order.
    ///
    /// Returns `None` once all senders are dropped and the queue is drained.
    pub async fn recv(&mut self) -> Option<Arc<Message>> {
        self.rx.recv().await
    }

    /// Takes a message if one is ready.
    pub fn try_recv(&mut self) -> Option<Arc<Message>> {
        self.rx.try_recv().ok()
    }
}

/// Creates a mailbox holding at most `capacity` pending messages (minimum 1).
pub fn mailbox(capacity: usize) -> (MailboxSender, MailboxReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (MailboxSender { tx }, MailboxReceiver { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(text: &str) -> Arc<Message> {
        Arc::new(Message::error(text))
    }

    #[tokio::test]
    async fn delivers_in_arrival_order() {
        let (tx, mut rx) = mailbox(4);
        assert_eq!(tx.offer(msg("one")), Delivery::Delivered);
        assert_eq!(tx.offer(msg("two")), Delivery::Delivered);

        assert_eq!(rx.recv().await.unwrap().content, "one");
        assert_eq!(rx.recv().await.unwrap().content, "two");
    }

    #[test]
    fn full_mailbox_rejects_without_waiting() {
        let (tx, _rx) = mailbox(1);
        assert_eq!(tx.offer(msg("one")), Delivery::Delivered);
        assert_eq!(tx.offer(msg("two")), Delivery::Full);
    }

    #[test]
    fn dropped_receiver_reports_closed() {
        let (tx, rx) = mailbox(1);
        drop(rx);
        assert!(tx.is_closed());
        assert_eq!(tx.offer(msg("late")), Delivery::Closed);
    }

    #[tokio::test]
    async fn receiver_drains_then_ends_after_senders_drop() {
        let (tx, mut rx) = mailbox(2);
        tx.offer(msg("pending"));
        drop(tx);

        assert_eq!(rx.recv().await.unwrap().content, "pending");
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let (tx, _rx) = mailbox(0);
        assert_eq!(tx.offer(msg("only")), Delivery::Delivered);
        assert_eq!(tx.offer(msg("extra")), Delivery::Full);
    }
}
