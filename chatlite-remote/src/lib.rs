//! Remote chat service integration for chatlite
//!
//! This crate defines the request/response contract the reconciliation
//! engine talks to, and a reqwest-backed implementation of it.

pub mod base;
pub mod http;

pub use base::{
    ChatService, Exchange, RemoteError, RemoteResult, WireMessage, WireRole, WireSession,
};
pub use http::HttpChatService;
