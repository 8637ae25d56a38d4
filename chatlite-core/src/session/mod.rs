//! Session bookkeeping
//!
//! The registry tracks the sessions the remote service knows about, in the
//! order it reported them, together with the id of the active session.

pub mod registry;

pub use registry::{Session, SessionRegistry, DEFAULT_SESSION_LABEL};
