//! Scripted in-memory chat service shared by the engine tests

#![allow(dead_code)]

use async_trait::async_trait;
use chatlite_core::config::EngineConfig;
use chatlite_core::{Message, Role, Session};
use chatlite_engine::{ChatEngine, EngineView};
use chatlite_remote::{ChatService, Exchange, RemoteError, RemoteResult};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{watch, Notify};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Submit { text: String, session_id: String },
    ListSessions,
    History(String),
    Delete(String),
    Rename { session_id: String, new_name: String },
}

/// Behaves like the chat server, with switches for failures and gates
/// that hold individual submits until released.
#[derive(Default)]
pub struct ScriptedService {
    calls: Mutex<Vec<Call>>,
    sessions: Mutex<Vec<Session>>,
    histories: Mutex<HashMap<String, Vec<Message>>>,
    held: Mutex<HashMap<String, Arc<Notify>>>,
    failing_texts: Mutex<HashSet<String>>,
    fail_history: AtomicBool,
    fail_delete: AtomicBool,
    fail_rename: AtomicBool,
    fail_list: AtomicBool,
    next_id: AtomicUsize,
}

impl ScriptedService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| matches(c)).count()
    }

    pub fn set_sessions(&self, sessions: Vec<Session>) {
        *self.sessions.lock().unwrap() = sessions;
    }

    pub fn set_history(&self, session_id: &str, messages: Vec<Message>) {
        self.histories
            .lock()
            .unwrap()
            .insert(session_id.to_string(), messages);
    }

    /// Make submits of `text` fail
    pub fn fail_on(&self, text: &str) {
        self.failing_texts.lock().unwrap().insert(text.to_string());
    }

    pub fn fail_history(&self, fail: bool) {
        self.fail_history.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn fail_rename(&self, fail: bool) {
        self.fail_rename.store(fail, Ordering::SeqCst);
    }

    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    /// Hold submits of `text` until [`release`](Self::release) is called
    pub fn hold(&self, text: &str) {
        self.held
            .lock()
            .unwrap()
            .insert(text.to_string(), Arc::new(Notify::new()));
    }

    pub fn release(&self, text: &str) {
        if let Some(gate) = self.held.lock().unwrap().get(text) {
            gate.notify_one();
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn unavailable() -> RemoteError {
        RemoteError::Status {
            status: 503,
            body: "service unavailable".to_string(),
        }
    }
}

#[async_trait]
impl ChatService for ScriptedService {
    async fn submit(&self, text: &str, session_id: &str) -> RemoteResult<Exchange> {
        self.record(Call::Submit {
            text: text.to_string(),
            session_id: session_id.to_string(),
        });

        let gate = self.held.lock().unwrap().get(text).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.failing_texts.lock().unwrap().contains(text) {
            return Err(Self::unavailable());
        }

        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let exchange = Exchange {
            user: Message::confirmed(format!("srv-user-{n}"), Role::User, text),
            assistant: Message::confirmed(
                format!("srv-bot-{n}"),
                Role::Assistant,
                format!("echo: {text}"),
            ),
        };

        {
            let mut sessions = self.sessions.lock().unwrap();
            if !sessions.iter().any(|s| s.id == session_id) {
                sessions.insert(0, Session::new(session_id, Some(text.to_string())));
            }
        }
        let mut histories = self.histories.lock().unwrap();
        let history = histories.entry(session_id.to_string()).or_default();
        history.push(exchange.user.clone());
        history.push(exchange.assistant.clone());

        Ok(exchange)
    }

    async fn list_sessions(&self) -> RemoteResult<Vec<Session>> {
        self.record(Call::ListSessions);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        Ok(self.sessions.lock().unwrap().clone())
    }

    async fn history(&self, session_id: &str) -> RemoteResult<Vec<Message>> {
        self.record(Call::History(session_id.to_string()));
        if self.fail_history.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        Ok(self
            .histories
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_message(&self, message_id: &str) -> RemoteResult<()> {
        self.record(Call::Delete(message_id.to_string()));
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        for history in self.histories.lock().unwrap().values_mut() {
            history.retain(|m| m.id.as_str() != message_id);
        }
        Ok(())
    }

    async fn rename_session(&self, session_id: &str, new_name: &str) -> RemoteResult<()> {
        self.record(Call::Rename {
            session_id: session_id.to_string(),
            new_name: new_name.to_string(),
        });
        if self.fail_rename.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        let mut sessions = self.sessions.lock().unwrap();
        if let Some(session) = sessions.iter_mut().find(|s| s.id == session_id) {
            session.label = Some(new_name.to_string());
        }
        Ok(())
    }
}

pub fn engine_with(service: &Arc<ScriptedService>, config: EngineConfig) -> ChatEngine {
    ChatEngine::new(service.clone(), config)
}

pub fn engine(service: &Arc<ScriptedService>) -> ChatEngine {
    engine_with(service, EngineConfig::default())
}

pub fn confirmed(id: &str, role: Role, text: &str) -> Message {
    Message::confirmed(id, role, text)
}

/// Wait until the published view satisfies `predicate`
pub async fn wait_for(
    rx: &mut watch::Receiver<EngineView>,
    predicate: impl FnMut(&EngineView) -> bool,
) {
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(predicate))
        .await
        .expect("timed out waiting for view")
        .expect("engine dropped");
}
