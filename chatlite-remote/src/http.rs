//! HTTP/JSON implementation of the chat service

use crate::base::{
    ChatReply, ChatRequest, ChatService, Exchange, HistoryReply, RemoteError, RemoteResult,
    RenameRequest, SessionsReply,
};
use async_trait::async_trait;
use chatlite_core::config::RemoteConfig;
use chatlite_core::{Message, Session};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Chat service client speaking the `/chat`, `/sessions`, `/history`,
/// `/delete` and `/rename` endpoints
pub struct HttpChatService {
    client: Client,
    base_url: String,
}

impl HttpChatService {
    /// Create a new client for `base_url` with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> RemoteResult<Self> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(RemoteError::ConfigError(
                "remote base URL must not be empty".to_string(),
            ));
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Create a client from the `remote` configuration section
    pub fn from_config(config: &RemoteConfig) -> RemoteResult<Self> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn url_with_id(&self, path: &str, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, path, urlencoding::encode(id))
    }

    async fn ensure_success(response: Response) -> RemoteResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(RemoteError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> RemoteResult<T> {
        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ChatService for HttpChatService {
    async fn submit(&self, text: &str, session_id: &str) -> RemoteResult<Exchange> {
        let url = self.url("chat");
        debug!("Submitting message to {} for session {}", url, session_id);

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest {
                message: text,
                session_id,
            })
            .send()
            .await?;

        let reply: ChatReply = Self::read_json(response).await?;
        if reply.user.id.is_empty() || reply.bot.id.is_empty() {
            return Err(RemoteError::InvalidResponse(
                "chat reply is missing message ids".to_string(),
            ));
        }
        Ok(Exchange {
            user: reply.user.into(),
            assistant: reply.bot.into(),
        })
    }

    async fn list_sessions(&self) -> RemoteResult<Vec<Session>> {
        let response = self.client.get(self.url("sessions")).send().await?;
        let reply: SessionsReply = Self::read_json(response).await?;
        Ok(reply.sessions.into_iter().map(Into::into).collect())
    }

    async fn history(&self, session_id: &str) -> RemoteResult<Vec<Message>> {
        let url = self.url_with_id("history", session_id);
        debug!("Fetching history from {}", url);

        let response = self.client.get(&url).send().await?;
        let reply: HistoryReply = Self::read_json(response).await?;
        Ok(reply.messages.into_iter().map(Into::into).collect())
    }

    async fn delete_message(&self, message_id: &str) -> RemoteResult<()> {
        let url = self.url_with_id("delete", message_id);
        let response = self.client.delete(&url).send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn rename_session(&self, session_id: &str, new_name: &str) -> RemoteResult<()> {
        let url = self.url_with_id("rename", session_id);
        let response = self
            .client
            .put(&url)
            .json(&RenameRequest { new_name })
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }
}
