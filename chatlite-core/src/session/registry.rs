//! Session registry

use crate::utils::truncate_chars;
use serde::{Deserialize, Serialize};

/// Label shown for sessions that have no title yet
pub const DEFAULT_SESSION_LABEL: &str = "New Chat";

/// A conversation session known to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Session id (server-issued, or a client token for an unsaved session)
    pub id: String,
    /// Title: the first user message, or an explicit rename
    pub label: Option<String>,
}

impl Session {
    /// Create a new session entry
    pub fn new(id: impl Into<String>, label: Option<String>) -> Self {
        Self {
            id: id.into(),
            label,
        }
    }

    /// Label suitable for display, cut to `max_chars` characters
    pub fn display_label(&self, max_chars: usize) -> String {
        match self.label.as_deref() {
            Some(label) if !label.is_empty() => truncate_chars(label, max_chars),
            _ => DEFAULT_SESSION_LABEL.to_string(),
        }
    }
}

/// Known sessions plus the active session id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionRegistry {
    sessions: Vec<Session>,
    active: Option<String>,
}

impl SessionRegistry {
    /// Create an empty registry with no active session
    pub fn new() -> Self {
        Self::default()
    }

    /// Sessions in the order the remote service reported them
    pub fn list(&self) -> &[Session] {
        &self.sessions
    }

    /// Active session id, if any
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Set (or clear) the active session id
    pub fn set_active(&mut self, id: Option<String>) {
        self.active = id;
    }

    /// Update the label of a known session; unknown ids are ignored
    pub fn upsert_label(&mut self, id: &str, label: impl Into<String>) -> bool {
        match self.sessions.iter_mut().find(|s| s.id == id) {
            Some(session) => {
                session.label = Some(label.into());
                true
            }
            None => false,
        }
    }

    /// Insert a placeholder entry for a session not yet confirmed remotely
    pub fn add_provisional(&mut self, id: impl Into<String>) {
        let id = id.into();
        if !self.contains(&id) {
            self.sessions.push(Session::new(id, None));
        }
    }

    /// Replace the list with a fresh copy from the remote service
    pub fn replace_all(&mut self, sessions: Vec<Session>) {
        self.sessions = sessions;
    }

    /// Get a session by id
    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Whether the registry knows `id`
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
}
