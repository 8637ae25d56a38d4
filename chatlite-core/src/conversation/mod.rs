//! Conversation state for the active session
//!
//! A conversation is the ordered list of user/assistant messages that is
//! currently loaded. Messages start out provisional (client-generated ids)
//! and are either replaced by their confirmed counterparts or marked failed.

pub mod message;
pub mod store;

pub use message::{Message, MessageId, MessageStatus, Role, FAILURE_TEXT, LOADING_TEXT};
pub use store::MessageStore;
