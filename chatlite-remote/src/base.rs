//! Base trait and wire types for the remote chat service

use async_trait::async_trait;
use chatlite_core::{Message, Role, Session};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for remote service operations
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type RemoteResult<T> = Result<T, RemoteError>;

impl From<RemoteError> for chatlite_core::Error {
    fn from(e: RemoteError) -> Self {
        match e {
            RemoteError::ConfigError(msg) => chatlite_core::Error::Config(msg),
            other => chatlite_core::Error::Remote(other.to_string()),
        }
    }
}

/// Author tag used on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    User,
    Bot,
}

impl From<WireRole> for Role {
    fn from(role: WireRole) -> Self {
        match role {
            WireRole::User => Role::User,
            WireRole::Bot => Role::Assistant,
        }
    }
}

/// A message as the remote service encodes it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub role: WireRole,
    #[serde(default)]
    pub text: String,
}

impl From<WireMessage> for Message {
    fn from(wire: WireMessage) -> Self {
        Message::confirmed(wire.id, wire.role.into(), wire.text)
    }
}

/// A session as the remote service encodes it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireSession {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "firstMessage", default)]
    pub first_message: Option<String>,
}

impl From<WireSession> for Session {
    fn from(wire: WireSession) -> Self {
        Session::new(wire.id, wire.first_message)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub message: &'a str,
    #[serde(rename = "sessionId")]
    pub session_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatReply {
    pub user: WireMessage,
    pub bot: WireMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionsReply {
    #[serde(default)]
    pub sessions: Vec<WireSession>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryReply {
    #[serde(default)]
    pub messages: Vec<WireMessage>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RenameRequest<'a> {
    #[serde(rename = "newName")]
    pub new_name: &'a str,
}

/// The confirmed pair returned for one submitted message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub user: Message,
    pub assistant: Message,
}

/// Request/response chat service the engine reconciles against
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Submit a user message and wait for the assistant reply
    async fn submit(&self, text: &str, session_id: &str) -> RemoteResult<Exchange>;

    /// List known sessions in server order
    async fn list_sessions(&self) -> RemoteResult<Vec<Session>>;

    /// Fetch the full message history of a session
    async fn history(&self, session_id: &str) -> RemoteResult<Vec<Message>>;

    /// Delete a confirmed message
    async fn delete_message(&self, message_id: &str) -> RemoteResult<()>;

    /// Rename a session
    async fn rename_session(&self, session_id: &str, new_name: &str) -> RemoteResult<()>;
}
