//! Conversation store: the ordered, append-only message list

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::{
    events::ChatEvent,
    message::{Message, Sender},
};

struct Inner {
    messages: Vec<Message>,
    next_id: u64,
}

/// Ordered messages for the current session.
///
/// Cloning is cheap; clones share the same list. Ids are assigned under the
/// lock, so they stay monotonic even when appends from overlapping sends
/// interleave.
#[derive(Clone)]
pub struct ConversationStore {
    inner: Arc<Mutex<Inner>>,
    events: broadcast::Sender<ChatEvent>,
}

impl ConversationStore {
    pub fn new(events: broadcast::Sender<ChatEvent>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                messages: Vec::new(),
                next_id: 1,
            })),
            events,
        }
    }

    /// Replace the whole conversation with a single message
    pub fn initialize(&self, text: impl Into<String>, sender: Sender) -> Message {
        let message = Message {
            id: 1,
            text: text.into(),
            sender,
        };
        {
            let mut inner = self.inner.lock();
            inner.messages = vec![message.clone()];
            inner.next_id = 2;
        }
        let _ = self.events.send(ChatEvent::ConversationReset {
            messages: vec![message.clone()],
        });
        message
    }

    /// Add a message to the end, assigning the next id
    pub fn append(&self, text: impl Into<String>, sender: Sender) -> Message {
        let message = {
            let mut inner = self.inner.lock();
            let message = Message {
                id: inner.next_id,
                text: text.into(),
                sender,
            };
            inner.next_id += 1;
            inner.messages.push(message.clone());
            message
        };
        let _ = self.events.send(ChatEvent::MessageAppended {
            message: message.clone(),
        });
        message
    }

    /// Current messages in display order
    pub fn snapshot(&self) -> Vec<Message> {
        self.inner.lock().messages.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (ConversationStore, broadcast::Receiver<ChatEvent>) {
        let (tx, rx) = broadcast::channel(16);
        (ConversationStore::new(tx), rx)
    }

    #[test]
    fn test_append_assigns_increasing_ids() {
        let (store, _rx) = store();
        let a = store.append("a", Sender::User);
        let b = store.append("b", Sender::Bot);
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_initialize_replaces_everything() {
        let (store, _rx) = store();
        store.append("old", Sender::User);
        store.append("older", Sender::Bot);

        let greeting = store.initialize("반갑습니다", Sender::Bot);
        assert_eq!(greeting.id, 1);
        assert_eq!(store.snapshot(), vec![greeting]);

        let next = store.append("hi", Sender::User);
        assert_eq!(next.id, 2);
    }

    #[test]
    fn test_snapshot_preserves_order() {
        let (store, _rx) = store();
        for text in ["one", "two", "three"] {
            store.append(text, Sender::Bot);
        }
        let texts: Vec<String> = store.snapshot().into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_mutations_emit_events() {
        let (store, mut rx) = store();
        store.initialize("hello", Sender::Bot);
        store.append("hey", Sender::User);

        assert!(matches!(
            rx.try_recv().unwrap(),
            ChatEvent::ConversationReset { messages } if messages.len() == 1
        ));
        assert!(matches!(
            rx.try_recv().unwrap(),
            ChatEvent::MessageAppended { message } if message.id == 2 && message.is_user()
        ));
    }

    #[test]
    fn test_append_without_subscribers() {
        let (tx, rx) = broadcast::channel(4);
        drop(rx);
        let store = ConversationStore::new(tx);
        store.append("still stored", Sender::Bot);
        let texts: Vec<String> = store.snapshot().into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["still stored"]);
    }
}
