//! Core types and stores for chatlite
//!
//! This crate provides the message and session data model, the two
//! client-side aggregates (message store and session registry), the
//! read-only view projection, and the shared error, configuration and
//! logging plumbing used by the other chatlite crates.

pub mod config;
pub mod conversation;
pub mod error;
pub mod logging;
pub mod session;
pub mod utils;
pub mod view;

pub use conversation::{
    Message, MessageId, MessageStatus, MessageStore, Role, FAILURE_TEXT, LOADING_TEXT,
};
pub use error::{Error, Result};
pub use session::{Session, SessionRegistry};
pub use view::{project, ChatView, MessageView, SessionView};
