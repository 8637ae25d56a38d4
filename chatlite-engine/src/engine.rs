//! Reconciliation engine: the single owner of chat state

use crate::ids::IdGenerator;
use crate::state::{EngineState, EngineView, RenameDraft};
use chatlite_core::config::{EngineConfig, StaleResponsePolicy};
use chatlite_core::session::DEFAULT_SESSION_LABEL;
use chatlite_core::{Error, Message, MessageId, Result, Role, FAILURE_TEXT};
use chatlite_remote::ChatService;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// A send whose provisional messages are in the store and whose remote
/// call has not completed yet
///
/// The ids captured here are the only ones the completion will touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    pub text: String,
    pub session_id: String,
    pub user_id: MessageId,
    pub assistant_id: MessageId,
    /// Whether the session token was generated by this send
    pub new_session: bool,
    epoch: u64,
}

/// Result of a send
#[derive(Debug)]
pub enum SendOutcome {
    /// Blank input, nothing happened
    Ignored,
    /// Both provisional messages were replaced by their confirmed versions
    Delivered {
        session_id: String,
        user: Message,
        assistant: Message,
    },
    /// The remote call failed and the placeholder now shows the failure notice
    Failed { session_id: String, error: Error },
    /// The reply or failure arrived for a conversation that is no longer displayed
    Discarded { session_id: String },
}

impl SendOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, SendOutcome::Delivered { .. })
    }
}

/// Orchestrates chat intents against the remote service
///
/// All store mutations happen synchronously under one lock that is never
/// held across a remote call, so the state is always consistent to read.
/// Every mutation republishes an [`EngineView`] to subscribers.
pub struct ChatEngine {
    service: Arc<dyn ChatService>,
    config: EngineConfig,
    ids: IdGenerator,
    state: Mutex<EngineState>,
    view_tx: watch::Sender<EngineView>,
}

impl ChatEngine {
    /// Create an engine with no active session and an empty session list
    pub fn new(service: Arc<dyn ChatService>, config: EngineConfig) -> Self {
        let state = EngineState::default();
        let (view_tx, _) = watch::channel(state.view(config.label_max_chars));
        Self {
            service,
            config,
            ids: IdGenerator::new(),
            state: Mutex::new(state),
            view_tx,
        }
    }

    /// Subscribe to view updates
    pub fn subscribe(&self) -> watch::Receiver<EngineView> {
        self.view_tx.subscribe()
    }

    /// Current view
    pub fn view(&self) -> EngineView {
        self.state.lock().view(self.config.label_max_chars)
    }

    /// Active session id, if any
    pub fn active_session(&self) -> Option<String> {
        self.state.lock().active_session()
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut EngineState) -> R) -> R {
        let mut state = self.state.lock();
        let result = f(&mut state);
        self.view_tx
            .send_replace(state.view(self.config.label_max_chars));
        result
    }

    fn is_stale(&self, state: &EngineState, epoch: u64) -> bool {
        self.config.stale_responses == StaleResponsePolicy::Discard && state.epoch != epoch
    }

    // --- sending -----------------------------------------------------------

    /// Send a message and wait for it to be reconciled
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        match self.begin_send(text) {
            Some(pending) => self.finish_send(pending).await,
            None => SendOutcome::Ignored,
        }
    }

    /// Send whatever is in the composer
    pub async fn submit_draft(&self) -> SendOutcome {
        let pending = self.mutate(|state| {
            let text = state.draft.clone();
            self.prepare_send(state, &text)
        });
        match pending {
            Some(pending) => self.finish_send(pending).await,
            None => SendOutcome::Ignored,
        }
    }

    /// Insert the provisional pair for `text` without contacting the service
    ///
    /// Returns `None` for blank input.
    pub fn begin_send(&self, text: &str) -> Option<PendingSend> {
        if text.trim().is_empty() {
            return None;
        }
        self.mutate(|state| self.prepare_send(state, text))
    }

    fn prepare_send(&self, state: &mut EngineState, text: &str) -> Option<PendingSend> {
        if text.trim().is_empty() {
            return None;
        }

        let (session_id, new_session) = match state.active_session() {
            Some(id) => (id, false),
            None => {
                let id = self.ids.session_token();
                info!("Starting new session {}", id);
                state.sessions.set_active(Some(id.clone()));
                if self.config.show_provisional_sessions {
                    state.sessions.add_provisional(id.clone());
                }
                (id, true)
            }
        };

        let (user_id, assistant_id) = self.ids.provisional_pair();
        state.messages.append([
            Message::new(user_id.clone(), Role::User, text),
            Message::placeholder(assistant_id.as_str()),
        ]);
        state.draft.clear();

        Some(PendingSend {
            text: text.to_string(),
            session_id,
            user_id,
            assistant_id,
            new_session,
            epoch: state.epoch,
        })
    }

    /// Issue the remote call for a pending send and apply its result
    pub async fn finish_send(&self, pending: PendingSend) -> SendOutcome {
        debug!(
            "Submitting {} / {} to session {}",
            pending.user_id, pending.assistant_id, pending.session_id
        );

        match self.service.submit(&pending.text, &pending.session_id).await {
            Ok(exchange) => {
                let applied = self.mutate(|state| {
                    if self.is_stale(state, pending.epoch) {
                        return None;
                    }
                    state
                        .messages
                        .replace(&pending.user_id, exchange.user.clone());
                    state
                        .messages
                        .replace(&pending.assistant_id, exchange.assistant.clone());
                    Some(pending.new_session || !state.sessions.contains(&pending.session_id))
                });

                let Some(unlisted) = applied else {
                    debug!("Discarding reply for session {}", pending.session_id);
                    return SendOutcome::Discarded {
                        session_id: pending.session_id,
                    };
                };

                if unlisted && self.config.sync_sessions_on_create {
                    if let Err(e) = self.refresh_sessions().await {
                        warn!("Failed to refresh sessions after first send: {}", e);
                    }
                }

                SendOutcome::Delivered {
                    session_id: pending.session_id,
                    user: exchange.user,
                    assistant: exchange.assistant,
                }
            }
            Err(e) => {
                error!("Failed to send message: {}", e);
                let marked = self.mutate(|state| {
                    if self.is_stale(state, pending.epoch) {
                        return None;
                    }
                    Some(
                        state
                            .messages
                            .mark_failed(&pending.assistant_id, FAILURE_TEXT),
                    )
                });
                match marked {
                    None => {
                        debug!("Discarding failure for session {}", pending.session_id);
                        return SendOutcome::Discarded {
                            session_id: pending.session_id,
                        };
                    }
                    Some(false) => {
                        debug!("Placeholder {} no longer displayed", pending.assistant_id);
                    }
                    Some(true) => {}
                }
                SendOutcome::Failed {
                    session_id: pending.session_id,
                    error: e.into(),
                }
            }
        }
    }

    // --- deleting ----------------------------------------------------------

    /// Delete a message
    ///
    /// Provisional messages are removed locally. Confirmed messages are
    /// deleted remotely first, then the current session is reloaded.
    pub async fn delete_message(&self, id: &MessageId) -> Result<()> {
        if id.is_provisional() {
            self.mutate(|state| state.messages.remove_by_id(id));
            return Ok(());
        }

        let (session_id, epoch) = {
            let state = self.state.lock();
            (state.active_session(), state.epoch)
        };

        if let Err(e) = self.service.delete_message(id.as_str()).await {
            error!("Failed to delete message {}: {}", id, e);
            return Err(e.into());
        }

        self.mutate(|state| state.messages.remove_by_id(id));

        let Some(session_id) = session_id else {
            return Ok(());
        };

        match self.service.history(&session_id).await {
            Ok(messages) => {
                self.mutate(|state| {
                    if self.is_stale(state, epoch) {
                        debug!("Discarding history of session {}", session_id);
                    } else {
                        state.messages.load_snapshot(messages);
                    }
                });
                Ok(())
            }
            Err(e) => {
                error!("Failed to reload session {} after delete: {}", session_id, e);
                Err(e.into())
            }
        }
    }

    // --- sessions ----------------------------------------------------------

    /// Load a session's history and make it the active conversation
    ///
    /// On failure the active session and the displayed messages stay as they were.
    pub async fn switch_session(&self, session_id: &str) -> Result<()> {
        let epoch = self.state.lock().epoch;

        let messages = match self.service.history(session_id).await {
            Ok(messages) => messages,
            Err(e) => {
                error!("Failed to load session {}: {}", session_id, e);
                return Err(e.into());
            }
        };

        self.mutate(|state| {
            if self.is_stale(state, epoch) {
                debug!("Discarding late load of session {}", session_id);
                return;
            }
            state.messages.load_snapshot(messages);
            state.sessions.set_active(Some(session_id.to_string()));
            state.epoch += 1;
        });
        Ok(())
    }

    /// Start a fresh, unsaved conversation
    pub fn new_chat(&self) {
        self.mutate(|state| {
            state.messages.load_snapshot(Vec::new());
            state.sessions.set_active(None);
            state.rename = None;
            state.epoch += 1;
        });
    }

    /// Reload the session list from the service
    pub async fn refresh_sessions(&self) -> Result<()> {
        let sessions = match self.service.list_sessions().await {
            Ok(sessions) => sessions,
            Err(e) => {
                error!("Failed to load sessions: {}", e);
                return Err(e.into());
            }
        };

        self.mutate(|state| {
            state.sessions.replace_all(sessions);
            if self.config.show_provisional_sessions {
                if let Some(active) = state.active_session() {
                    state.sessions.add_provisional(active);
                }
            }
        });
        Ok(())
    }

    /// Rename a session
    ///
    /// Blank names are rejected without contacting the service.
    pub async fn rename_session(&self, session_id: &str, new_name: &str) -> Result<()> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(Error::Validation(
                "session name must not be empty".to_string(),
            ));
        }

        if let Err(e) = self.service.rename_session(session_id, new_name).await {
            error!("Failed to rename session {}: {}", session_id, e);
            return Err(e.into());
        }

        self.mutate(|state| {
            if !state.sessions.upsert_label(session_id, new_name) {
                debug!("Renamed session {} is not listed", session_id);
            }
            if state
                .rename
                .as_ref()
                .is_some_and(|draft| draft.session_id == session_id)
            {
                state.rename = None;
            }
        });
        Ok(())
    }

    // --- composer ----------------------------------------------------------

    /// Replace the composer text
    pub fn set_draft(&self, text: impl Into<String>) {
        let text = text.into();
        self.mutate(|state| state.draft = text);
    }

    /// Current composer text
    pub fn draft(&self) -> String {
        self.state.lock().draft.clone()
    }

    /// Start editing a session's label; unknown sessions are ignored
    pub fn begin_rename(&self, session_id: &str) -> bool {
        self.mutate(|state| {
            let Some(session) = state.sessions.get(session_id) else {
                return false;
            };
            let text = session
                .label
                .clone()
                .filter(|label| !label.is_empty())
                .unwrap_or_else(|| DEFAULT_SESSION_LABEL.to_string());
            state.rename = Some(RenameDraft {
                session_id: session_id.to_string(),
                text,
            });
            true
        })
    }

    /// Replace the rename text; ignored when no rename is in progress
    pub fn set_rename_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.mutate(|state| {
            if let Some(draft) = state.rename.as_mut() {
                draft.text = text;
            }
        });
    }

    /// Leave rename editing without saving
    pub fn cancel_rename(&self) {
        self.mutate(|state| state.rename = None);
    }

    /// Save the rename in progress
    ///
    /// On failure the edit stays open so it can be retried.
    pub async fn commit_rename(&self) -> Result<()> {
        let draft = self.state.lock().rename.clone();
        let Some(draft) = draft else {
            return Err(Error::Validation("no rename in progress".to_string()));
        };
        self.rename_session(&draft.session_id, &draft.text).await
    }
}
