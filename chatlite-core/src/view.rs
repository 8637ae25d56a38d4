//! Read-only view projection
//!
//! Presentation layers render a [`ChatView`]; they never touch the stores.
//! Projections are pure and may be recomputed at any time.

use crate::conversation::{MessageStatus, MessageStore, Role};
use crate::session::SessionRegistry;
use serde::Serialize;

/// Default number of label characters shown for a session
pub const DEFAULT_LABEL_CHARS: usize = 30;

/// A message row ready for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageView {
    pub id: String,
    pub role: Role,
    pub text: String,
    pub status: MessageStatus,
    /// Deleting a provisional message never reaches the remote service
    pub provisional: bool,
}

/// A session row ready for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub id: String,
    pub label: String,
    pub active: bool,
}

/// Everything a presentation layer needs to draw the chat
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChatView {
    pub messages: Vec<MessageView>,
    pub sessions: Vec<SessionView>,
    pub active_session_id: Option<String>,
}

/// Project the stores with the default label width
pub fn project(store: &MessageStore, registry: &SessionRegistry) -> ChatView {
    project_with_label_width(store, registry, DEFAULT_LABEL_CHARS)
}

/// Project the stores, cutting session labels to `label_chars` characters
pub fn project_with_label_width(
    store: &MessageStore,
    registry: &SessionRegistry,
    label_chars: usize,
) -> ChatView {
    let active = registry.active();

    let messages = store
        .messages()
        .iter()
        .map(|m| MessageView {
            id: m.id.as_str().to_string(),
            role: m.role,
            text: m.text.clone(),
            status: m.status(),
            provisional: m.is_provisional(),
        })
        .collect();

    let sessions = registry
        .list()
        .iter()
        .map(|s| SessionView {
            id: s.id.clone(),
            label: s.display_label(label_chars),
            active: Some(s.id.as_str()) == active,
        })
        .collect();

    ChatView {
        messages,
        sessions,
        active_session_id: active.map(ToString::to_string),
    }
}
