//! Engine event types

use serde::Serialize;

use crate::{message::Message, state::ScreenState};

/// Events emitted whenever the chat screen should re-render
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// The conversation was replaced (bootstrap)
    ConversationReset { messages: Vec<Message> },

    /// A message was added to the end; the view scrolls to it
    MessageAppended { message: Message },

    /// The screen moved to a new state
    StateChanged { state: ScreenState },
}

impl ChatEvent {
    /// Whether the conversation itself changed
    pub fn touches_conversation(&self) -> bool {
        matches!(
            self,
            ChatEvent::ConversationReset { .. } | ChatEvent::MessageAppended { .. }
        )
    }
}
