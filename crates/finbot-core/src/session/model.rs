use serde::{Deserialize, Serialize};

use super::message::{ConversationMessage, MessageRole};

/// Opening line of every new or reset conversation.
pub const GREETING_MESSAGE: &str =
    "Hi there! I'm FinBot, your AI financial assistant. How can I help you today?";

/// Append-only log of the messages exchanged in one conversation.
///
/// Insertion order is chronological order: `append` never lets a timestamp
/// go backwards, so the log stays sorted even if the wall clock is adjusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSession {
    messages: Vec<ConversationMessage>,
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationSession {
    /// Creates a session holding only the assistant greeting.
    pub fn new() -> Self {
        Self {
            messages: vec![ConversationMessage::new(
                MessageRole::Assistant,
                GREETING_MESSAGE,
            )],
        }
    }

    /// Creates a session with no messages at all.
    pub fn empty() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Appends a message, clamping its timestamp to the previous one if needed.
    ///
    /// Returns a reference to the stored message.
    pub fn append(&mut self, mut message: ConversationMessage) -> &ConversationMessage {
        if let Some(last) = self.messages.last() {
            if message.timestamp < last.timestamp {
                message.timestamp = last.timestamp;
            }
        }
        self.messages.push(message);
        // Just pushed, so the log is non-empty
        &self.messages[self.messages.len() - 1]
    }

    /// Clears the log back to the single greeting message.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    /// The last `n` messages, oldest first.
    pub fn last_messages(&self, n: usize) -> &[ConversationMessage] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    pub fn last(&self) -> Option<&ConversationMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
