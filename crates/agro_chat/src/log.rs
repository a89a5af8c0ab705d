//! Append-only conversation log.
//!
//! Every append is broadcast as a [`LogEvent`] so a renderer can scroll to
//! the newest entry without polling.

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::debug;

use crate::types::{Message, MessageId, Sender};

/// Buffered events per subscriber before it starts lagging
const EVENT_CAPACITY: usize = 64;

/// Change notification sent to log subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum LogEvent {
    /// A message was appended; renderers should show it and scroll to it
    Appended(Message),
}

/// Ordered, append-only sequence of messages.
#[derive(Debug)]
pub struct ConversationLog {
    messages: Vec<Message>,
    next_id: u64,
    events: broadcast::Sender<LogEvent>,
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationLog {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            messages: Vec::new(),
            next_id: 1,
            events,
        }
    }

    /// Append a message and notify subscribers.
    ///
    /// IDs increase by one per append. The timestamp is clamped to the
    /// previous entry's so timestamps never decrease, even if the wall clock
    /// steps backwards.
    pub fn append(&mut self, sender: Sender, text: impl Into<String>) -> Message {
        let now = Utc::now();
        let created_at = match self.messages.last() {
            Some(last) if last.created_at > now => last.created_at,
            _ => now,
        };

        let message = Message::new(MessageId(self.next_id), sender, text.into(), created_at);
        self.next_id += 1;
        self.messages.push(message.clone());

        debug!(id = %message.id, sender = ?message.sender, "Appended message");

        // No subscribers is fine; the renderer may not be attached yet
        let _ = self.events.send(LogEvent::Appended(message.clone()));

        message
    }

    /// Copy of all messages in append order
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Receive a [`LogEvent`] for every append made after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<LogEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_assigns_increasing_ids() {
        let mut log = ConversationLog::new();

        let first = log.append(Sender::User, "hello");
        let second = log.append(Sender::Assistant, "hi there");
        let third = log.append(Sender::User, "thanks");

        assert_eq!(first.id, MessageId(1));
        assert!(first.id < second.id && second.id < third.id);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_timestamps_are_non_decreasing() {
        let mut log = ConversationLog::new();
        for i in 0..50 {
            log.append(Sender::User, format!("message {}", i));
        }

        let snapshot = log.snapshot();
        for pair in snapshot.windows(2) {
            assert!(pair[0].created_at <= pair[1].created_at);
        }
    }

    #[test]
    fn test_text_is_stored_verbatim() {
        let mut log = ConversationLog::new();
        let stored = log.append(Sender::Assistant, "  **Maize**\n* water  ");

        assert_eq!(stored.text, "  **Maize**\n* water  ");
        assert_eq!(log.last(), Some(&stored));
    }

    #[test]
    fn test_snapshot_is_detached_from_later_appends() {
        let mut log = ConversationLog::new();
        log.append(Sender::User, "one");

        let snapshot = log.snapshot();
        log.append(Sender::Assistant, "two");

        assert_eq!(snapshot.len(), 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_every_append_is_broadcast() {
        let mut log = ConversationLog::new();
        let mut events = log.subscribe();

        let user = log.append(Sender::User, "question");
        let reply = log.append(Sender::Assistant, "answer");

        assert_eq!(events.try_recv().unwrap(), LogEvent::Appended(user));
        assert_eq!(events.try_recv().unwrap(), LogEvent::Appended(reply));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_append_without_subscribers_succeeds() {
        let mut log = ConversationLog::new();
        assert!(log.is_empty());

        log.append(Sender::User, "nobody listening");
        assert_eq!(log.len(), 1);
    }
}
