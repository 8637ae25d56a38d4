//! Message data structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder text of an assistant reply that is still in flight
pub const LOADING_TEXT: &str = "Loading...";

/// Text an assistant placeholder takes when the remote call failed
pub const FAILURE_TEXT: &str = "Unable to get data from API";

/// Identifier of a message, tagged with the space it was issued in
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "space", content = "value", rename_all = "snake_case")]
pub enum MessageId {
    /// Client-generated id, never seen by the remote service
    Provisional(String),
    /// Id issued by the remote service
    Confirmed(String),
}

impl MessageId {
    /// Prefix carried by every provisional id in its string form
    pub const PROVISIONAL_PREFIX: &'static str = "temp-";

    /// Create a provisional id
    pub fn provisional(id: impl Into<String>) -> Self {
        MessageId::Provisional(id.into())
    }

    /// Create a confirmed id
    pub fn confirmed(id: impl Into<String>) -> Self {
        MessageId::Confirmed(id.into())
    }

    /// Classify a raw id string coming from outside the store
    /// (a presentation layer, a command line argument).
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with(Self::PROVISIONAL_PREFIX) {
            MessageId::Provisional(raw.to_string())
        } else {
            MessageId::Confirmed(raw.to_string())
        }
    }

    /// The raw id string
    pub fn as_str(&self) -> &str {
        match self {
            MessageId::Provisional(id) | MessageId::Confirmed(id) => id,
        }
    }

    /// Whether this id is local-only
    pub fn is_provisional(&self) -> bool {
        matches!(self, MessageId::Provisional(_))
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

/// Delivery status of a message, derived from its id and failure flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Provisional,
    Confirmed,
    Failed,
}

/// A chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message id
    pub id: MessageId,
    /// Message author
    pub role: Role,
    /// Message text
    pub text: String,
    /// Set when the remote call this message was waiting on failed
    #[serde(default)]
    failed: bool,
}

impl Message {
    /// Create a new message
    pub fn new(id: MessageId, role: Role, text: impl Into<String>) -> Self {
        Self {
            id,
            role,
            text: text.into(),
            failed: false,
        }
    }

    /// Create a message issued by the remote service
    pub fn confirmed(id: impl Into<String>, role: Role, text: impl Into<String>) -> Self {
        Self::new(MessageId::confirmed(id), role, text)
    }

    /// Create an assistant placeholder awaiting its reply
    pub fn placeholder(id: impl Into<String>) -> Self {
        Self::new(MessageId::provisional(id), Role::Assistant, LOADING_TEXT)
    }

    /// Derived delivery status
    pub fn status(&self) -> MessageStatus {
        match (&self.id, self.failed) {
            (MessageId::Confirmed(_), _) => MessageStatus::Confirmed,
            (MessageId::Provisional(_), true) => MessageStatus::Failed,
            (MessageId::Provisional(_), false) => MessageStatus::Provisional,
        }
    }

    /// Whether the message only exists locally
    pub fn is_provisional(&self) -> bool {
        self.id.is_provisional()
    }

    /// Replace the text with a failure notice, keeping the id as is
    pub fn mark_failed(&mut self, notice: impl Into<String>) {
        self.text = notice.into();
        self.failed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_classifies_by_prefix() {
        assert_eq!(
            MessageId::parse("temp-user-1"),
            MessageId::provisional("temp-user-1")
        );
        assert_eq!(
            MessageId::parse("65f0c0ffee"),
            MessageId::confirmed("65f0c0ffee")
        );
    }

    #[test]
    fn test_status_is_derived() {
        let mut msg = Message::placeholder("temp-bot-1");
        assert_eq!(msg.status(), MessageStatus::Provisional);
        assert_eq!(msg.text, LOADING_TEXT);

        msg.mark_failed(FAILURE_TEXT);
        assert_eq!(msg.status(), MessageStatus::Failed);
        assert!(msg.is_provisional());
        assert_eq!(msg.id.as_str(), "temp-bot-1");

        let confirmed = Message::confirmed("abc", Role::Assistant, "hi");
        assert_eq!(confirmed.status(), MessageStatus::Confirmed);
    }
}
