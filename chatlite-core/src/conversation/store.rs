//! Ordered message store for the active conversation

use super::message::{Message, MessageId};
use tracing::warn;

/// Holds the ordered messages of the conversation currently loaded
///
/// Every operation is synchronous and total: lookups of ids that are not
/// present are no-ops, since a late response may race a deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageStore {
    messages: Vec<Message>,
}

impl MessageStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch of messages at the end of the conversation
    ///
    /// Messages whose id is already present are skipped.
    pub fn append(&mut self, batch: impl IntoIterator<Item = Message>) {
        for message in batch {
            if self.contains(&message.id) {
                warn!("Skipping duplicate message id {}", message.id);
                continue;
            }
            self.messages.push(message);
        }
    }

    /// Substitute the message carrying `id`, keeping its position
    ///
    /// Returns `false` when `id` is absent.
    pub fn replace(&mut self, id: &MessageId, message: Message) -> bool {
        let Some(position) = self.position(id) else {
            return false;
        };

        // Keep ids unique if the replacement id is already loaded elsewhere.
        let new_id = message.id.clone();
        self.messages[position] = message;
        let mut index = 0;
        self.messages.retain(|m| {
            let keep = index == position || m.id != new_id;
            index += 1;
            keep
        });
        true
    }

    /// Remove the message carrying `id`, if present
    pub fn remove_by_id(&mut self, id: &MessageId) -> Option<Message> {
        self.position(id).map(|position| self.messages.remove(position))
    }

    /// Replace the whole conversation
    pub fn load_snapshot(&mut self, messages: Vec<Message>) {
        self.messages.clear();
        self.append(messages);
    }

    /// Mark the message carrying `id` as failed with a notice text
    pub fn mark_failed(&mut self, id: &MessageId, notice: &str) -> bool {
        match self.get_mut(id) {
            Some(message) => {
                message.mark_failed(notice);
                true
            }
            None => false,
        }
    }

    /// Get a message by id
    pub fn get(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }

    fn get_mut(&mut self, id: &MessageId) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| &m.id == id)
    }

    fn position(&self, id: &MessageId) -> Option<usize> {
        self.messages.iter().position(|m| &m.id == id)
    }

    /// Whether a message with `id` is loaded
    pub fn contains(&self, id: &MessageId) -> bool {
        self.position(id).is_some()
    }

    /// Messages in conversation order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of loaded messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the conversation is empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
