//! State owned by the engine and the view it publishes

use chatlite_core::view::project_with_label_width;
use chatlite_core::{ChatView, MessageStore, SessionRegistry};
use serde::Serialize;

/// An in-progress session rename
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameDraft {
    pub session_id: String,
    pub text: String,
}

/// Snapshot handed to presentation layers after every change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineView {
    pub chat: ChatView,
    /// Text in the message composer
    pub draft: String,
    /// Session currently being renamed, if any
    pub rename: Option<RenameDraft>,
}

/// Everything the engine mutates, guarded by a single lock
#[derive(Debug, Default)]
pub(crate) struct EngineState {
    pub messages: MessageStore,
    pub sessions: SessionRegistry,
    pub draft: String,
    pub rename: Option<RenameDraft>,
    /// Bumped whenever the displayed conversation is swapped out
    pub epoch: u64,
}

impl EngineState {
    pub fn view(&self, label_chars: usize) -> EngineView {
        EngineView {
            chat: project_with_label_width(&self.messages, &self.sessions, label_chars),
            draft: self.draft.clone(),
            rename: self.rename.clone(),
        }
    }

    pub fn active_session(&self) -> Option<String> {
        self.sessions.active().map(ToString::to_string)
    }
}
